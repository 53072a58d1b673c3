//! Input and event types shared by the scene controller and its hosts

use glam::Vec2;

use super::node::NodeId;

/// One touch point, in scene coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub location: Vec2,
}

impl Touch {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            location: Vec2::new(x, y),
        }
    }
}

/// Where the player is in the pick / drag / release gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimState {
    /// No orange in hand
    Idle,
    /// Orange picked from the tree and being dragged
    Aiming { origin: Vec2, projectile: NodeId },
    /// Orange released; still in the slot and still reacts to touches
    Launched { origin: Vec2, projectile: NodeId },
}

impl AimState {
    /// The orange occupying the projectile slot, if any
    pub fn projectile(&self) -> Option<NodeId> {
        self.slot().map(|(_, projectile)| projectile)
    }

    /// Last recorded aim origin and the orange in the slot
    pub fn slot(&self) -> Option<(Vec2, NodeId)> {
        match *self {
            AimState::Idle => None,
            AimState::Aiming { origin, projectile } | AimState::Launched { origin, projectile } => {
                Some((origin, projectile))
            }
        }
    }
}

/// Things that happened in the scene, drained by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ProjectileSpawned { id: NodeId, at: Vec2 },
    /// The previous orange was detached to make room for a new one
    ProjectileDiscarded { id: NodeId },
    /// `moved` is false when the body was not dynamic
    ImpulseApplied { id: NodeId, impulse: Vec2, moved: bool },
    ProjectileLaunched { id: NodeId, impulse: Vec2 },
    SkullDestroyed { id: NodeId, at: Vec2 },
    LevelRequested { level: u32 },
}

/// Capability to switch the presented level
pub trait Navigator {
    fn present_level(&mut self, level: u32);
}

/// Navigator that just remembers the last request
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingTransition {
    level: Option<u32>,
}

impl PendingTransition {
    pub fn take(&mut self) -> Option<u32> {
        self.level.take()
    }
}

impl Navigator for PendingTransition {
    fn present_level(&mut self, level: u32) {
        self.level = Some(level);
    }
}
