//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web build.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum particles in a single explosion burst
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 48,
            QualityPreset::High => 128,
        }
    }
}

/// How a drag is turned into a launch impulse.
///
/// The game this was modelled on built the impulse from the vertical drag
/// delta on both axes. `Independent` uses each axis' own delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LaunchAxes {
    /// `(dx, dy)`
    #[default]
    Independent,
    /// `(dy, dy)`
    MirrorY,
}

impl LaunchAxes {
    /// Combine the scaled per-axis deltas into an impulse vector
    pub fn shape(self, delta: Vec2) -> Vec2 {
        match self {
            LaunchAxes::Independent => delta,
            LaunchAxes::MirrorY => Vec2::new(delta.y, delta.y),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Explosion particles
    pub particles: bool,
    /// Draw the aim line while dragging
    pub aim_line: bool,
    /// Drag to impulse policy
    #[serde(default)]
    pub launch_axes: LaunchAxes,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            aim_line: true,
            launch_axes: LaunchAxes::Independent,
        }
    }
}

impl Settings {
    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "orange_tree_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
