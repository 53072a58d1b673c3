//! Scene presentation
//!
//! The director owns the level library and the presented scene. Scene code
//! never swaps itself out: it asks through a [`Navigator`] and the director
//! performs the transition once the touch handler has returned.

use crate::assets::LevelLibrary;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameScene, PendingTransition, Touch, tick};

/// Owns the presented [`GameScene`] and drives its fixed-step clock
#[derive(Debug)]
pub struct Director {
    library: LevelLibrary,
    settings: Settings,
    scene: GameScene,
    accumulator: f32,
    seed: u64,
    presented: u32,
}

impl Director {
    /// Present `level` first; `None` if it cannot be loaded
    pub fn new(library: LevelLibrary, settings: Settings, level: u32, seed: u64) -> Option<Self> {
        let scene = GameScene::load(&library, level, seed, &settings)?;
        Some(Self {
            library,
            settings,
            scene,
            accumulator: 0.0,
            seed,
            presented: 1,
        })
    }

    pub fn scene(&self) -> &GameScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut GameScene {
        &mut self.scene
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn library(&self) -> &LevelLibrary {
        &self.library
    }

    /// Scenes presented so far, including the first
    pub fn presented(&self) -> u32 {
        self.presented
    }

    /// Replace the presented scene with a fresh `Level-<level>`.
    ///
    /// A missing level keeps the current scene and returns false.
    pub fn present_level(&mut self, level: u32) -> bool {
        // Each presentation gets its own stream so replays stay reproducible
        let seed = self.seed.wrapping_add(u64::from(self.presented));
        match GameScene::load(&self.library, level, seed, &self.settings) {
            Some(scene) => {
                log::info!("Presenting level {level}");
                self.scene = scene;
                self.accumulator = 0.0;
                self.presented += 1;
                true
            }
            None => {
                log::warn!("Level {level} unavailable, keeping level {}", self.scene.level());
                false
            }
        }
    }

    pub fn touches_began(&mut self, touches: &[Touch]) {
        let mut transition = PendingTransition::default();
        self.scene.touches_began(touches, &mut transition);
        if let Some(level) = transition.take() {
            self.present_level(level);
        }
    }

    pub fn touches_moved(&mut self, touches: &[Touch]) {
        self.scene.touches_moved(touches);
    }

    pub fn touches_ended(&mut self, touches: &[Touch]) {
        self.scene.touches_ended(touches);
    }

    /// Run the simulation for `frame_dt` seconds of wall time.
    ///
    /// Returns the number of fixed steps taken.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.scene, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.3}s of backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Events from the presented scene since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.scene.drain_events()
    }
}
