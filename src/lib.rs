//! Orange Tree - fling oranges from a tree at skulls
//!
//! Core modules:
//! - `sim`: Scene graph, physics world, projectile and scene controller
//! - `assets`: Level documents, textures and particle definitions
//! - `director`: Owns the presented scene and performs level transitions
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Player preferences

pub mod assets;
pub mod director;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{AssetError, LevelLibrary};
pub use director::Director;
pub use settings::{LaunchAxes, QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (120 Hz for stable contacts)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Scene points per physics metre
    pub const POINTS_PER_METER: f32 = 150.0;
    /// Gravity in points/s² (9.8 m/s² downward)
    pub const GRAVITY: f32 = -9.8 * POINTS_PER_METER;
    /// Body density in kg/m²
    pub const DEFAULT_DENSITY: f32 = 1.0;
    pub const DEFAULT_RESTITUTION: f32 = 0.2;

    /// Contacts must exceed this impulse (kg·pt/s) to destroy a skull
    pub const SKULL_IMPACT_THRESHOLD: f32 = 15.0;
    /// Levels reachable from the sun
    pub const NUM_OF_LEVELS: u32 = 3;

    /// Drag displacement to launch impulse factor
    pub const LAUNCH_SCALE: f32 = 0.5;
    /// Impulse applied the moment an orange is picked from the tree
    pub const FORWARD_IMPULSE: Vec2 = Vec2::new(100.0, 0.0);

    /// Seconds an explosion stays in the scene
    pub const EXPLOSION_LIFETIME: f32 = 1.0;

    /// Aim line look
    pub const AIM_LINE_WIDTH: f32 = 20.0;
    pub const AIM_LINE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.3];

    /// Sun offset from the top-right corner, in sun sizes
    pub const SUN_INSET: f32 = 0.75;

    /// Resource names
    pub const ORANGE_TEXTURE: &str = "Orange";
    pub const SUN_TEXTURE: &str = "Sun";
    pub const EXPLOSION_EMITTER: &str = "Explosion";
}

/// Uniform scale that fits the scene inside the viewport
#[inline]
pub fn fit_scale(viewport: Vec2, scene_size: Vec2) -> f32 {
    (viewport.x / scene_size.x).min(viewport.y / scene_size.y)
}

/// Convert a screen position (origin top-left, y down) to scene coordinates
/// (origin at scene center, y up)
pub fn screen_to_scene(screen: Vec2, viewport: Vec2, scene_size: Vec2) -> Vec2 {
    let scale = fit_scale(viewport, scene_size);
    let centered = Vec2::new(screen.x - viewport.x / 2.0, -(screen.y - viewport.y / 2.0));
    centered / scale
}

/// Convert scene coordinates to normalized device coordinates
pub fn scene_to_ndc(point: Vec2, viewport: Vec2, scene_size: Vec2) -> Vec2 {
    let scale = fit_scale(viewport, scene_size);
    point * scale / (viewport / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_center_maps_to_origin() {
        let viewport = Vec2::new(800.0, 600.0);
        let scene = Vec2::new(1024.0, 768.0);
        let p = screen_to_scene(Vec2::new(400.0, 300.0), viewport, scene);
        assert!(p.length() < 0.001);
    }

    #[test]
    fn test_screen_y_is_flipped() {
        let viewport = Vec2::new(1024.0, 768.0);
        let scene = Vec2::new(1024.0, 768.0);
        // Top-left corner of the screen is the top-left of the scene
        let p = screen_to_scene(Vec2::ZERO, viewport, scene);
        assert!((p.x + 512.0).abs() < 0.001);
        assert!((p.y - 384.0).abs() < 0.001);
    }

    #[test]
    fn test_scene_corner_lands_on_ndc_edge() {
        // Wider viewport: height is the limiting axis
        let viewport = Vec2::new(1600.0, 768.0);
        let scene = Vec2::new(1024.0, 768.0);
        let ndc = scene_to_ndc(Vec2::new(0.0, 384.0), viewport, scene);
        assert!((ndc.y - 1.0).abs() < 0.001);
        let ndc = scene_to_ndc(Vec2::new(512.0, 0.0), viewport, scene);
        assert!(ndc.x < 1.0);
    }
}
