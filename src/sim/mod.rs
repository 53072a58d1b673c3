//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (scene insertion order)
//! - No rendering or platform dependencies

pub mod body;
pub mod controller;
pub mod effects;
pub mod node;
pub mod physics;
pub mod projectile;
pub mod state;
pub mod tick;

pub use body::{PhysicsBody, Shape};
pub use controller::{GameScene, pick_level, release_vector};
pub use effects::{Emitter, Particle};
pub use node::{LineShape, Node, NodeId, NodeKind, Scene, Visual};
pub use physics::{Contact, PhysicsWorld};
pub use state::{AimState, GameEvent, Navigator, PendingTransition, Touch};
pub use tick::tick;
