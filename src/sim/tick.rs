//! Fixed timestep simulation tick
//!
//! Advances one presented scene deterministically: delayed actions, particle
//! effects, physics, then contact callbacks in the order they began.

use super::controller::GameScene;
use super::node::Visual;

/// Advance the scene by one fixed timestep
pub fn tick(game: &mut GameScene, dt: f32) {
    let removed = game.scene.advance_actions(dt);
    if !removed.is_empty() {
        log::trace!("Delayed removals: {removed:?}");
    }

    for node in game.scene.nodes_mut() {
        if let Visual::Emitter(emitter) = &mut node.visual {
            emitter.advance(dt);
        }
    }

    let contacts = game.scene.step_physics(dt);
    for contact in &contacts {
        game.did_begin(contact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::LevelLibrary;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::node::NodeKind;

    fn level(n: u32) -> GameScene {
        let library = LevelLibrary::builtin().unwrap();
        GameScene::load(&library, n, 9, &Settings::default()).unwrap()
    }

    #[test]
    fn test_builtin_levels_settle_without_breaking_skulls() {
        for n in 1..=crate::consts::NUM_OF_LEVELS {
            let mut game = level(n);
            let skulls = game.scene.count_of_kind(NodeKind::Skull);
            for _ in 0..240 {
                tick(&mut game, SIM_DT);
            }
            assert_eq!(
                game.scene.count_of_kind(NodeKind::Skull),
                skulls,
                "level {n} lost a skull while settling"
            );
        }
    }

    #[test]
    fn test_tick_is_deterministic() {
        let mut a = level(1);
        let mut b = level(1);
        for _ in 0..120 {
            tick(&mut a, SIM_DT);
            tick(&mut b, SIM_DT);
        }
        let pa: Vec<_> = a.scene.nodes().iter().map(|n| n.position).collect();
        let pb: Vec<_> = b.scene.nodes().iter().map(|n| n.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_skulls_stay_inside_boundary() {
        let mut game = level(3);
        for _ in 0..600 {
            tick(&mut game, SIM_DT);
        }
        let half = game.scene.size / 2.0;
        for skull in game.scene.nodes().iter().filter(|n| n.kind == NodeKind::Skull) {
            assert!(skull.position.x.abs() <= half.x);
            assert!(skull.position.y.abs() <= half.y);
        }
    }
}
