//! Scene controller
//!
//! Turns touches into oranges and launches, and contacts into destroyed
//! skulls. One gesture at a time: the first touch of every event is the only
//! one looked at.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::PhysicsBody;
use super::effects::Emitter;
use super::node::{LineShape, Node, NodeId, NodeKind, Scene, Visual};
use super::physics::Contact;
use super::projectile;
use super::state::{AimState, GameEvent, Navigator, Touch};
use crate::assets::{EmitterDef, LevelDoc, LevelLibrary, NodeDoc, Texture};
use crate::consts::*;
use crate::settings::{LaunchAxes, Settings};

/// Impulse for a drag from `origin` released at `end`
pub fn release_vector(origin: Vec2, end: Vec2, axes: LaunchAxes) -> Vec2 {
    axes.shape((origin - end) * LAUNCH_SCALE)
}

/// Uniform pick in `1..=num_of_levels`
pub fn pick_level(rng: &mut impl Rng, num_of_levels: u32) -> u32 {
    rng.random_range(1..=num_of_levels.max(1))
}

/// # Panics
/// Touch events always carry at least one touch.
fn primary_touch(touches: &[Touch]) -> Touch {
    match touches.first() {
        Some(touch) => *touch,
        None => panic!("touch event delivered with an empty touch set"),
    }
}

fn node_from_doc(doc: &NodeDoc, library: &LevelLibrary) -> Node {
    let texture_size = doc
        .texture
        .as_deref()
        .and_then(|name| library.texture(name))
        .map(|t| t.size);
    let size = if doc.size != Vec2::ZERO {
        doc.size
    } else {
        texture_size.unwrap_or(Vec2::ZERO)
    };

    let mut node = match &doc.texture {
        Some(texture) => Node::sprite(doc.kind, texture, size),
        None => Node {
            size,
            ..Node::new(doc.kind)
        },
    };
    node.position = doc.position;
    node.z = doc.z;
    node.body = doc.body.as_ref().map(|b| b.to_body());
    node
}

/// A presented level and everything the player does in it
#[derive(Debug, Clone)]
pub struct GameScene {
    pub scene: Scene,
    level: u32,
    aim: AimState,
    aim_line: NodeId,
    boundary: NodeId,
    num_of_levels: u32,
    orange_texture: Option<Texture>,
    explosion: Option<EmitterDef>,
    settings: Settings,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameScene {
    /// Build the scene for resource `Level-<level>`; `None` if it does not exist
    pub fn load(
        library: &LevelLibrary,
        level: u32,
        seed: u64,
        settings: &Settings,
    ) -> Option<Self> {
        let name = LevelLibrary::level_name(level);
        let Some(doc) = library.level(&name) else {
            log::warn!("Level resource {name} not found");
            return None;
        };
        log::info!("Loading {name} ({} nodes)", doc.nodes.len());
        Some(Self::from_level(doc, library, level, seed, settings))
    }

    /// Build a scene from an already-parsed level document
    pub fn from_level(
        doc: &LevelDoc,
        library: &LevelLibrary,
        level: u32,
        seed: u64,
        settings: &Settings,
    ) -> Self {
        let mut scene = Scene::new(doc.size);
        for node in &doc.nodes {
            scene.add_child(node_from_doc(node, library));
        }

        // Aim line, drawn over everything but the sun
        let aim_line = scene.add_child(
            Node {
                visual: Visual::Line(LineShape {
                    path: None,
                    width: AIM_LINE_WIDTH,
                    color: AIM_LINE_COLOR,
                }),
                ..Node::new(NodeKind::AimLine)
            }
            .with_z(4.0),
        );

        // Boundary loop around the playable area, anchored on the background
        let background = scene
            .first_of_kind(NodeKind::Background)
            .map(|n| n.size)
            .unwrap_or_else(|| {
                log::warn!("Level {level} has no background; boundary anchored at origin");
                Vec2::ZERO
            });
        let boundary = scene.add_child(
            Node::new(NodeKind::Boundary)
                .at(-background / 2.0)
                .with_body(PhysicsBody::edge_loop(doc.size)),
        );

        // Sun in the top-right corner
        match library.texture(SUN_TEXTURE) {
            Some(sun) => {
                let position = doc.size / 2.0 - sun.size * SUN_INSET;
                scene.add_child(
                    Node::sprite(NodeKind::Sun, SUN_TEXTURE, sun.size)
                        .at(position)
                        .with_z(5.0),
                );
            }
            None => log::warn!("No {SUN_TEXTURE} texture; level switching disabled"),
        }

        let orange_texture = library.texture(ORANGE_TEXTURE).copied();
        if orange_texture.is_none() {
            log::warn!("No {ORANGE_TEXTURE} texture; the tree will not give oranges");
        }

        Self {
            scene,
            level,
            aim: AimState::Idle,
            aim_line,
            boundary,
            num_of_levels: NUM_OF_LEVELS,
            orange_texture,
            explosion: library.emitter(EXPLOSION_EMITTER).cloned(),
            settings: settings.clone(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn num_of_levels(&self) -> u32 {
        self.num_of_levels
    }

    pub fn aim_state(&self) -> AimState {
        self.aim
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The orange in the projectile slot
    pub fn projectile(&self) -> Option<&Node> {
        self.aim.projectile().and_then(|id| self.scene.node(id))
    }

    pub fn aim_line_id(&self) -> NodeId {
        self.aim_line
    }

    pub fn boundary_id(&self) -> NodeId {
        self.boundary
    }

    /// Current aim line segment
    pub fn aim_path(&self) -> Option<(Vec2, Vec2)> {
        match self.scene.node(self.aim_line).map(|n| &n.visual) {
            Some(Visual::Line(line)) => line.path,
            _ => None,
        }
    }

    /// Events recorded so far, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pick an orange when the tree is hit; switch level when the sun is hit.
    ///
    /// # Panics
    /// If `touches` is empty.
    pub fn touches_began(&mut self, touches: &[Touch], navigator: &mut dyn Navigator) {
        let location = primary_touch(touches).location;

        let hit = self
            .scene
            .node_at(location)
            .and_then(|id| self.scene.node(id))
            .map(|n| n.kind);
        if hit == Some(NodeKind::Tree) {
            self.pick_orange(location);
        }

        let sun_tapped = self
            .scene
            .nodes_at(location)
            .into_iter()
            .filter_map(|id| self.scene.node(id))
            .any(|n| n.kind == NodeKind::Sun);
        if sun_tapped {
            let level = pick_level(&mut self.rng, self.num_of_levels);
            log::info!("Sun tapped, switching to level {level}");
            self.events.push(GameEvent::LevelRequested { level });
            navigator.present_level(level);
        }
    }

    /// Drag the orange in the slot and redraw the aim line from the last
    /// origin. A launched orange is dragged too.
    ///
    /// # Panics
    /// If `touches` is empty.
    pub fn touches_moved(&mut self, touches: &[Touch]) {
        let location = primary_touch(touches).location;
        let Some((origin, projectile)) = self.aim.slot() else {
            return;
        };

        if let Some(node) = self.scene.node_mut(projectile) {
            node.position = location;
        }
        self.set_aim_path(Some((origin, location)));
    }

    /// Launch the orange in the slot along the drag and clear the aim line.
    /// Every release pushes the orange again, even one already in flight.
    ///
    /// # Panics
    /// If `touches` is empty.
    pub fn touches_ended(&mut self, touches: &[Touch]) {
        let location = primary_touch(touches).location;

        if let Some((origin, projectile)) = self.aim.slot() {
            let impulse = release_vector(origin, location, self.settings.launch_axes);
            if let Some(body) = self
                .scene
                .node_mut(projectile)
                .and_then(|n| n.body.as_mut())
            {
                body.dynamic = true;
            }
            self.apply_impulse(projectile, impulse);
            self.aim = AimState::Launched { origin, projectile };
            self.events.push(GameEvent::ProjectileLaunched {
                id: projectile,
                impulse,
            });
            log::info!(
                "Orange launched with impulse ({:.1}, {:.1})",
                impulse.x,
                impulse.y
            );
        }

        self.set_aim_path(None);
    }

    /// Destroy a skull on a hard enough contact.
    ///
    /// Participants are checked in contact order (`a` then `b`); only the
    /// first skull found is removed.
    pub fn did_begin(&mut self, contact: &Contact) {
        if contact.collision_impulse <= SKULL_IMPACT_THRESHOLD {
            return;
        }

        let target = [contact.a, contact.b].into_iter().find(|&id| {
            self.scene
                .node(id)
                .is_some_and(|n| n.kind.breaks_on_impact())
        });

        if let Some(id) = target {
            if let Some(at) = self.remove_skull(id, contact.collision_impulse) {
                self.skull_destroyed_particles(at);
            }
        }
    }

    fn pick_orange(&mut self, location: Vec2) {
        let Some(texture) = self.orange_texture else {
            return;
        };

        self.discard_projectile();

        let mut orange = projectile::orange(&texture).at(location);
        if let Some(body) = orange.body.as_mut() {
            body.dynamic = false;
        }
        let id = self.scene.add_child(orange);
        self.aim = AimState::Aiming {
            origin: location,
            projectile: id,
        };
        self.events.push(GameEvent::ProjectileSpawned { id, at: location });
        log::debug!("Orange {:?} picked at ({:.0}, {:.0})", id, location.x, location.y);

        self.apply_impulse(id, FORWARD_IMPULSE);
    }

    /// Empty the projectile slot, detaching whatever was in it
    fn discard_projectile(&mut self) {
        if let Some(id) = self.aim.projectile() {
            if self.scene.remove_from_parent(id).is_some() {
                log::debug!("Orange {:?} discarded", id);
                self.events.push(GameEvent::ProjectileDiscarded { id });
            }
        }
        self.aim = AimState::Idle;
    }

    fn apply_impulse(&mut self, id: NodeId, impulse: Vec2) -> bool {
        let moved = self
            .scene
            .node_mut(id)
            .and_then(|n| n.body.as_mut())
            .is_some_and(|b| b.apply_impulse(impulse));
        self.events.push(GameEvent::ImpulseApplied { id, impulse, moved });
        moved
    }

    fn set_aim_path(&mut self, path: Option<(Vec2, Vec2)>) {
        let path = path.filter(|_| self.settings.aim_line);
        let visual = self.scene.node_mut(self.aim_line).map(|n| &mut n.visual);
        if let Some(Visual::Line(line)) = visual {
            line.path = path;
        }
    }

    /// Remove a skull, returning where it was
    fn remove_skull(&mut self, id: NodeId, impulse: f32) -> Option<Vec2> {
        let node = self.scene.remove_from_parent(id)?;
        log::info!(
            "Skull {:?} destroyed at ({:.0}, {:.0}), impulse {:.1}",
            id,
            node.position.x,
            node.position.y,
            impulse
        );
        self.events.push(GameEvent::SkullDestroyed {
            id,
            at: node.position,
        });
        Some(node.position)
    }

    /// Fire-and-forget explosion at `point`, removed after a fixed delay
    fn skull_destroyed_particles(&mut self, point: Vec2) -> Option<NodeId> {
        let def = self.explosion.as_ref()?;
        let emitter = Emitter::burst(def, &mut self.rng, self.settings.max_particles());
        let node = Node {
            visual: Visual::Emitter(emitter),
            ..Node::new(NodeKind::Explosion)
        }
        .at(point)
        .with_z(6.0);

        let id = self.scene.add_child(node);
        self.scene.remove_after(id, EXPLOSION_LIFETIME);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::Contact;
    use crate::sim::state::PendingTransition;
    use crate::sim::tick;
    use proptest::prelude::*;

    const TEST_LEVEL: &str = r#"{
        "size": [1024, 768],
        "nodes": [
            { "kind": "background", "size": [1024, 768], "z": -10 },
            { "kind": "tree", "position": [50, 50], "size": [100, 100] },
            { "kind": "skull", "position": [300, 0], "size": [48, 48],
              "body": { "shape": { "type": "circle", "radius": 24 } } },
            { "kind": "skull", "position": [300, 100], "size": [48, 48],
              "body": { "shape": { "type": "circle", "radius": 24 } } },
            { "kind": "ground", "position": [0, -364], "size": [1024, 40],
              "body": { "shape": { "type": "rect", "size": [1024, 40] }, "dynamic": false } }
        ]
    }"#;

    fn library() -> LevelLibrary {
        let mut library = LevelLibrary::new();
        library.add_texture(ORANGE_TEXTURE, Texture { size: Vec2::splat(60.0) });
        library.add_texture(SUN_TEXTURE, Texture { size: Vec2::splat(80.0) });
        library.add_emitter(
            EXPLOSION_EMITTER,
            EmitterDef {
                particle_count: 20,
                lifetime: 0.5,
                speed: 100.0,
                speed_range: 0.0,
                size: 4.0,
                color: [1.0, 0.5, 0.0, 1.0],
            },
        );
        library.load_level_json("Level-1", TEST_LEVEL).unwrap();
        library
    }

    fn game() -> GameScene {
        GameScene::load(&library(), 1, 42, &Settings::default()).unwrap()
    }

    fn game_with(settings: Settings) -> GameScene {
        GameScene::load(&library(), 1, 42, &settings).unwrap()
    }

    fn skulls(game: &GameScene) -> Vec<NodeId> {
        game.scene
            .nodes()
            .iter()
            .filter(|n| n.kind == NodeKind::Skull)
            .map(|n| n.id)
            .collect()
    }

    fn ground(game: &GameScene) -> NodeId {
        game.scene.first_of_kind(NodeKind::Ground).unwrap().id
    }

    fn contact(a: NodeId, b: NodeId, impulse: f32) -> Contact {
        Contact {
            a,
            b,
            point: Vec2::ZERO,
            normal: Vec2::Y,
            collision_impulse: impulse,
        }
    }

    fn pick(game: &mut GameScene, x: f32, y: f32) {
        game.touches_began(&[Touch::at(x, y)], &mut PendingTransition::default());
    }

    #[test]
    fn test_unknown_level_is_none() {
        assert!(GameScene::load(&library(), 7, 1, &Settings::default()).is_none());
    }

    #[test]
    fn test_setup_places_boundary_sun_and_aim_line() {
        let game = game();

        let boundary = game.scene.node(game.boundary_id()).unwrap();
        assert_eq!(boundary.position, Vec2::new(-512.0, -384.0));
        assert!(boundary.body.as_ref().unwrap().is_edge_loop());

        let sun = game.scene.first_of_kind(NodeKind::Sun).unwrap();
        assert_eq!(sun.position, Vec2::new(512.0 - 60.0, 384.0 - 60.0));

        assert!(game.scene.contains(game.aim_line_id()));
        assert_eq!(game.aim_path(), None);
        assert_eq!(game.aim_state(), AimState::Idle);
    }

    #[test]
    fn test_missing_background_anchors_boundary_at_origin() {
        let mut library = library();
        library
            .load_level_json("Level-2", r#"{ "size": [200, 100], "nodes": [] }"#)
            .unwrap();
        let game = GameScene::load(&library, 2, 1, &Settings::default()).unwrap();
        assert_eq!(game.scene.node(game.boundary_id()).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_tap_tree_spawns_held_orange() {
        let mut game = game();
        pick(&mut game, 50.0, 50.0);

        let orange = game.projectile().unwrap();
        assert_eq!(orange.kind, NodeKind::Orange);
        assert_eq!(orange.position, Vec2::new(50.0, 50.0));
        assert!(!orange.is_dynamic());
        let id = orange.id;

        assert_eq!(
            game.aim_state(),
            AimState::Aiming {
                origin: Vec2::new(50.0, 50.0),
                projectile: id
            }
        );
        assert_eq!(
            game.events(),
            &[
                GameEvent::ProjectileSpawned {
                    id,
                    at: Vec2::new(50.0, 50.0)
                },
                GameEvent::ImpulseApplied {
                    id,
                    impulse: FORWARD_IMPULSE,
                    moved: false
                },
            ]
        );
    }

    #[test]
    fn test_tap_elsewhere_spawns_nothing() {
        let mut game = game();
        pick(&mut game, -300.0, -200.0);
        assert!(game.projectile().is_none());
        assert_eq!(game.scene.count_of_kind(NodeKind::Orange), 0);
        assert!(game.events().is_empty());
    }

    #[test]
    fn test_second_pick_discards_previous_orange() {
        let mut game = game();
        pick(&mut game, 50.0, 50.0);
        let first = game.projectile().unwrap().id;
        game.touches_moved(&[Touch::at(-200.0, -100.0)]);

        pick(&mut game, 60.0, 40.0);
        let second = game.projectile().unwrap().id;

        assert_ne!(first, second);
        assert!(!game.scene.contains(first));
        assert_eq!(game.scene.count_of_kind(NodeKind::Orange), 1);
        assert!(game.events().contains(&GameEvent::ProjectileDiscarded { id: first }));
    }

    #[test]
    fn test_drag_moves_orange_and_aim_line() {
        let mut game = game();
        pick(&mut game, 50.0, 50.0);
        game.touches_moved(&[Touch::at(-20.0, 10.0)]);

        assert_eq!(game.projectile().unwrap().position, Vec2::new(-20.0, 10.0));
        assert_eq!(
            game.aim_path(),
            Some((Vec2::new(50.0, 50.0), Vec2::new(-20.0, 10.0)))
        );
        // Still held
        assert!(!game.projectile().unwrap().is_dynamic());
    }

    #[test]
    fn test_move_without_orange_does_nothing() {
        let mut game = game();
        game.touches_moved(&[Touch::at(10.0, 10.0)]);
        assert_eq!(game.aim_path(), None);
    }

    #[test]
    fn test_release_uses_both_axes_by_default() {
        let mut game = game();
        pick(&mut game, 50.0, 50.0);
        game.touches_moved(&[Touch::at(150.0, 50.0)]);
        game.touches_ended(&[Touch::at(150.0, 50.0)]);

        let orange = game.projectile().unwrap();
        let id = orange.id;
        assert!(orange.is_dynamic());
        assert_eq!(game.aim_path(), None);
        assert_eq!(
            game.aim_state(),
            AimState::Launched {
                origin: Vec2::new(50.0, 50.0),
                projectile: id
            }
        );
        assert!(game.events().contains(&GameEvent::ProjectileLaunched {
            id,
            impulse: Vec2::new(-50.0, 0.0)
        }));
        // Dynamic now, so the impulse moved it
        assert!(game.events().contains(&GameEvent::ImpulseApplied {
            id,
            impulse: Vec2::new(-50.0, 0.0),
            moved: true
        }));
        assert!(orange.body.as_ref().unwrap().velocity.x < 0.0);
    }

    #[test]
    fn test_release_vector_policies() {
        let origin = Vec2::new(50.0, 50.0);
        let end = Vec2::new(150.0, 10.0);
        assert_eq!(
            release_vector(origin, end, LaunchAxes::Independent),
            Vec2::new(-50.0, 20.0)
        );
        // Single-axis behaviour: vertical delta on both components
        assert_eq!(
            release_vector(origin, end, LaunchAxes::MirrorY),
            Vec2::new(20.0, 20.0)
        );
        // A purely horizontal drag launches nothing under the single-axis policy
        assert_eq!(
            release_vector(origin, Vec2::new(150.0, 50.0), LaunchAxes::MirrorY),
            Vec2::ZERO
        );
    }

    #[test]
    fn test_mirror_y_setting_reaches_launch() {
        let mut game = game_with(Settings {
            launch_axes: LaunchAxes::MirrorY,
            ..Settings::default()
        });
        pick(&mut game, 50.0, 50.0);
        game.touches_ended(&[Touch::at(150.0, 10.0)]);
        let id = game.projectile().unwrap().id;
        assert!(game.events().contains(&GameEvent::ProjectileLaunched {
            id,
            impulse: Vec2::new(20.0, 20.0)
        }));
    }

    #[test]
    fn test_aim_line_setting_off_keeps_path_empty() {
        let mut game = game_with(Settings {
            aim_line: false,
            ..Settings::default()
        });
        pick(&mut game, 50.0, 50.0);
        game.touches_moved(&[Touch::at(0.0, 0.0)]);
        assert_eq!(game.aim_path(), None);
        assert_eq!(game.projectile().unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_release_without_orange_only_clears_line() {
        let mut game = game();
        game.touches_ended(&[Touch::at(10.0, 10.0)]);
        assert!(game.events().is_empty());
        assert_eq!(game.aim_state(), AimState::Idle);
    }

    #[test]
    fn test_launched_orange_follows_later_gestures() {
        let mut game = game();
        pick(&mut game, 50.0, 50.0);
        game.touches_ended(&[Touch::at(0.0, 0.0)]);
        let id = game.projectile().unwrap().id;

        // A new gesture away from the tree keeps the orange in the slot
        pick(&mut game, -300.0, -200.0);
        game.touches_moved(&[Touch::at(100.0, 100.0)]);
        assert_eq!(game.projectile().unwrap().position, Vec2::new(100.0, 100.0));
        assert_eq!(
            game.aim_path(),
            Some((Vec2::new(50.0, 50.0), Vec2::new(100.0, 100.0)))
        );

        let before = game.events().len();
        game.touches_ended(&[Touch::at(100.0, 100.0)]);
        let impulse = Vec2::new(-25.0, -25.0);
        assert_eq!(
            &game.events()[before..],
            &[
                GameEvent::ImpulseApplied {
                    id,
                    impulse,
                    moved: true
                },
                GameEvent::ProjectileLaunched { id, impulse },
            ]
        );
        assert_eq!(game.aim_path(), None);
        assert_eq!(
            game.aim_state(),
            AimState::Launched {
                origin: Vec2::new(50.0, 50.0),
                projectile: id
            }
        );
    }

    #[test]
    #[should_panic(expected = "empty touch set")]
    fn test_empty_touch_set_panics() {
        let mut game = game();
        game.touches_moved(&[]);
    }

    #[test]
    fn test_soft_contacts_are_ignored() {
        let mut game = game();
        let skull = skulls(&game)[0];
        let before = game.scene.len();

        game.did_begin(&contact(skull, ground(&game), 10.0));
        game.did_begin(&contact(skull, ground(&game), SKULL_IMPACT_THRESHOLD));

        assert!(game.scene.contains(skull));
        assert_eq!(game.scene.len(), before);
        assert_eq!(game.scene.count_of_kind(NodeKind::Explosion), 0);
    }

    #[test]
    fn test_hard_contact_destroys_skull_and_explodes() {
        let mut game = game();
        let skull = skulls(&game)[0];
        let at = game.scene.node(skull).unwrap().position;

        game.did_begin(&contact(skull, ground(&game), 20.0));

        assert!(!game.scene.contains(skull));
        let explosion = game.scene.first_of_kind(NodeKind::Explosion).unwrap();
        assert_eq!(explosion.position, at);
        assert_eq!(game.events(), &[GameEvent::SkullDestroyed { id: skull, at }]);

        // Replaying the same contact cannot remove it twice
        game.did_begin(&contact(skull, ground(&game), 20.0));
        assert_eq!(game.scene.count_of_kind(NodeKind::Explosion), 1);
    }

    #[test]
    fn test_skull_as_second_participant_explodes_at_its_own_position() {
        let mut game = game();
        let skull = skulls(&game)[1];
        let at = game.scene.node(skull).unwrap().position;

        game.did_begin(&contact(ground(&game), skull, 30.0));

        assert!(!game.scene.contains(skull));
        assert_eq!(game.scene.first_of_kind(NodeKind::Explosion).unwrap().position, at);
    }

    #[test]
    fn test_two_skulls_only_first_participant_removed() {
        let mut game = game();
        let ids = skulls(&game);
        let (first, second) = (ids[0], ids[1]);

        game.did_begin(&contact(second, first, 50.0));

        assert!(!game.scene.contains(second));
        assert!(game.scene.contains(first));
        assert_eq!(game.scene.count_of_kind(NodeKind::Explosion), 1);
    }

    #[test]
    fn test_explosion_removed_after_lifetime() {
        let mut game = game();
        game.scene.physics.gravity = Vec2::ZERO;
        let skull = skulls(&game)[0];
        game.did_begin(&contact(skull, ground(&game), 20.0));

        for _ in 0..60 {
            tick(&mut game, SIM_DT);
        }
        assert_eq!(game.scene.count_of_kind(NodeKind::Explosion), 1);
        for _ in 0..60 {
            tick(&mut game, SIM_DT);
        }
        assert_eq!(game.scene.count_of_kind(NodeKind::Explosion), 0);
    }

    #[test]
    fn test_missing_emitter_still_removes_skull() {
        let mut library = LevelLibrary::new();
        library.add_texture(ORANGE_TEXTURE, Texture { size: Vec2::splat(60.0) });
        library.load_level_json("Level-1", TEST_LEVEL).unwrap();
        let mut game = GameScene::load(&library, 1, 1, &Settings::default()).unwrap();
        let skull = skulls(&game)[0];

        game.did_begin(&contact(skull, ground(&game), 20.0));

        assert!(!game.scene.contains(skull));
        assert_eq!(game.scene.count_of_kind(NodeKind::Explosion), 0);
        // No sun texture either: no sun node
        assert_eq!(game.scene.count_of_kind(NodeKind::Sun), 0);
    }

    #[test]
    fn test_missing_orange_texture_disables_picking() {
        let mut library = LevelLibrary::new();
        library.load_level_json("Level-1", TEST_LEVEL).unwrap();
        let mut game = GameScene::load(&library, 1, 1, &Settings::default()).unwrap();
        pick(&mut game, 50.0, 50.0);
        assert!(game.projectile().is_none());
    }

    #[test]
    fn test_sun_tap_requests_level_in_range() {
        let mut game = game();
        let sun = game.scene.first_of_kind(NodeKind::Sun).unwrap().position;
        let mut navigator = PendingTransition::default();

        game.touches_began(&[Touch { location: sun }], &mut navigator);

        let level = navigator.take().unwrap();
        assert!((1..=NUM_OF_LEVELS).contains(&level));
        assert_eq!(game.events(), &[GameEvent::LevelRequested { level }]);
        // The sun is not a tree
        assert!(game.projectile().is_none());
    }

    #[test]
    fn test_tree_tap_requests_no_level() {
        let mut game = game();
        let mut navigator = PendingTransition::default();
        game.touches_began(&[Touch::at(50.0, 50.0)], &mut navigator);
        assert_eq!(navigator.take(), None);
    }

    #[test]
    fn test_level_pick_is_roughly_uniform() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut counts = [0u32; 3];
        for _ in 0..3000 {
            let level = pick_level(&mut rng, NUM_OF_LEVELS);
            counts[(level - 1) as usize] += 1;
        }
        for count in counts {
            assert!((850..=1150).contains(&count), "counts {counts:?}");
        }
    }

    #[test]
    fn test_fling_destroys_skull() {
        let mut game = game();
        game.scene.physics.gravity = Vec2::ZERO;
        let target = skulls(&game)[0]; // at (300, 0)

        // Pick at the tree's lower edge, pull back level with the skull
        pick(&mut game, 50.0, 5.0);
        game.touches_moved(&[Touch::at(-100.0, 0.0)]);
        game.touches_ended(&[Touch::at(-100.0, 0.0)]);

        for _ in 0..240 {
            tick(&mut game, SIM_DT);
        }

        assert!(!game.scene.contains(target));
        let destroyed =
            |e: &GameEvent| matches!(e, GameEvent::SkullDestroyed { id, .. } if *id == target);
        assert!(game.events().iter().any(destroyed));
    }

    proptest! {
        #[test]
        fn prop_aim_line_tracks_every_move(
            moves in prop::collection::vec((-500.0f32..500.0, -380.0f32..380.0), 1..20)
        ) {
            let mut game = game();
            pick(&mut game, 50.0, 50.0);
            for (x, y) in moves {
                game.touches_moved(&[Touch::at(x, y)]);
                prop_assert_eq!(game.aim_path(), Some((Vec2::new(50.0, 50.0), Vec2::new(x, y))));
            }
            game.touches_ended(&[Touch::at(0.0, 0.0)]);
            prop_assert_eq!(game.aim_path(), None);
        }

        #[test]
        fn prop_threshold_is_strict(impulse in 0.0f32..40.0) {
            let mut game = game();
            let skull = skulls(&game)[0];
            let ground = ground(&game);
            game.did_begin(&contact(skull, ground, impulse));
            prop_assert_eq!(game.scene.contains(skull), impulse <= SKULL_IMPACT_THRESHOLD);
        }

        #[test]
        fn prop_level_pick_in_range(seed in any::<u64>(), levels in 1u32..10) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let level = pick_level(&mut rng, levels);
            prop_assert!((1..=levels).contains(&level));
        }
    }
}
