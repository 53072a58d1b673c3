//! Physics bodies attached to scene nodes
//!
//! Units: positions and velocities in scene points, mass in kg (area is
//! measured in m² through `POINTS_PER_METER`), impulses in kg·pt/s.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DENSITY, DEFAULT_RESTITUTION, POINTS_PER_METER};

/// Collision shape, centred on the owning node except for edge loops
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f32 },
    /// Axis-aligned box
    Rect { size: Vec2 },
    /// Hollow rectangle starting at the node position; collides from inside
    EdgeLoop { size: Vec2 },
}

impl Shape {
    /// Area in m² (edge loops have none)
    pub fn area(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => {
                let r = radius / POINTS_PER_METER;
                std::f32::consts::PI * r * r
            }
            Shape::Rect { size } => {
                (size.x / POINTS_PER_METER) * (size.y / POINTS_PER_METER)
            }
            Shape::EdgeLoop { .. } => 0.0,
        }
    }
}

/// A rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub shape: Shape,
    /// Dynamic bodies move under gravity and impulses; others are immovable
    pub dynamic: bool,
    /// Points per second
    pub velocity: Vec2,
    pub restitution: f32,
    /// kg/m²
    pub density: f32,
}

impl PhysicsBody {
    pub fn new(shape: Shape) -> Self {
        let dynamic = !matches!(shape, Shape::EdgeLoop { .. });
        Self {
            shape,
            dynamic,
            velocity: Vec2::ZERO,
            restitution: DEFAULT_RESTITUTION,
            density: DEFAULT_DENSITY,
        }
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(Shape::Circle { radius })
    }

    pub fn rect(size: Vec2) -> Self {
        Self::new(Shape::Rect { size })
    }

    /// Edge loops are always static
    pub fn edge_loop(size: Vec2) -> Self {
        Self::new(Shape::EdgeLoop { size })
    }

    pub fn mass(&self) -> f32 {
        self.shape.area() * self.density
    }

    /// Zero for anything that cannot be pushed
    pub fn inverse_mass(&self) -> f32 {
        let mass = self.mass();
        if !self.dynamic || mass <= 0.0 {
            0.0
        } else {
            1.0 / mass
        }
    }

    /// Apply an instantaneous impulse. Non-dynamic bodies are unaffected.
    ///
    /// Returns whether the velocity changed.
    pub fn apply_impulse(&mut self, impulse: Vec2) -> bool {
        let inv_mass = self.inverse_mass();
        if inv_mass == 0.0 {
            return false;
        }
        self.velocity += impulse * inv_mass;
        true
    }

    pub fn is_edge_loop(&self) -> bool {
        matches!(self.shape, Shape::EdgeLoop { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_mass_uses_metres() {
        // 150pt radius = 1m radius
        let body = PhysicsBody::circle(150.0);
        assert!((body.mass() - std::f32::consts::PI).abs() < 0.001);
    }

    #[test]
    fn test_impulse_changes_velocity() {
        let mut body = PhysicsBody::rect(Vec2::splat(150.0)); // 1 kg
        assert!(body.apply_impulse(Vec2::new(10.0, -5.0)));
        assert!((body.velocity - Vec2::new(10.0, -5.0)).length() < 0.001);
    }

    #[test]
    fn test_non_dynamic_ignores_impulse() {
        let mut body = PhysicsBody::circle(20.0);
        body.dynamic = false;
        assert!(!body.apply_impulse(Vec2::new(100.0, 0.0)));
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_edge_loop_is_static() {
        let body = PhysicsBody::edge_loop(Vec2::new(100.0, 100.0));
        assert!(!body.dynamic);
        assert_eq!(body.inverse_mass(), 0.0);
        assert!(body.is_edge_loop());
    }

    #[test]
    fn test_shape_json_is_tagged() {
        let shape: Shape = serde_json::from_str(r#"{"type":"circle","radius":12.0}"#).unwrap();
        assert_eq!(shape, Shape::Circle { radius: 12.0 });
    }
}
