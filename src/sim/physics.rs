//! Rigid-body stepping and contact reporting
//!
//! Bodies integrate with semi-implicit Euler: gravity first, then contact
//! impulses on the new velocities, then positions. Contacts are reported
//! once, on the step a pair starts touching, with the impulse that step
//! resolved.

use std::collections::HashSet;

use glam::Vec2;

use super::body::{PhysicsBody, Shape};
use super::node::{Node, NodeId};
use crate::consts::GRAVITY;

/// Bodies closer than this still count as touching
pub const CONTACT_MARGIN: f32 = 0.5;
/// Penetration tolerated before positional correction kicks in
const POSITION_SLOP: f32 = 0.05;
/// Fraction of the remaining penetration corrected per step
const POSITION_CORRECTION: f32 = 0.8;
/// Approach speeds below this do not bounce (keeps resting stacks quiet)
const RESTING_SPEED: f32 = 30.0;

/// Overlap between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vec2,
    /// Overlap depth; slightly negative while within the contact margin
    pub penetration: f32,
    pub point: Vec2,
}

impl Manifold {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// A pair of nodes that started touching
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Earlier node in scene order
    pub a: NodeId,
    pub b: NodeId,
    pub point: Vec2,
    pub normal: Vec2,
    /// Impulse resolved on the first touching step (kg·pt/s)
    pub collision_impulse: f32,
}

/// Check two shapes at the given positions for contact
pub fn collide(a: &Shape, pos_a: Vec2, b: &Shape, pos_b: Vec2) -> Option<Manifold> {
    match (*a, *b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(pos_a, ra, pos_b, rb)
        }
        (Shape::Rect { size }, Shape::Circle { radius }) => rect_circle(pos_a, size, pos_b, radius),
        (Shape::Circle { radius }, Shape::Rect { size }) => {
            rect_circle(pos_b, size, pos_a, radius).map(Manifold::flipped)
        }
        (Shape::Rect { size: sa }, Shape::Rect { size: sb }) => rect_rect(pos_a, sa, pos_b, sb),
        (Shape::EdgeLoop { size }, Shape::Circle { radius }) => {
            edge_loop_box(pos_a, size, pos_b, Vec2::splat(radius))
        }
        (Shape::Circle { radius }, Shape::EdgeLoop { size }) => {
            edge_loop_box(pos_b, size, pos_a, Vec2::splat(radius)).map(Manifold::flipped)
        }
        (Shape::EdgeLoop { size: loop_size }, Shape::Rect { size }) => {
            edge_loop_box(pos_a, loop_size, pos_b, size / 2.0)
        }
        (Shape::Rect { size }, Shape::EdgeLoop { size: loop_size }) => {
            edge_loop_box(pos_b, loop_size, pos_a, size / 2.0).map(Manifold::flipped)
        }
        (Shape::EdgeLoop { .. }, Shape::EdgeLoop { .. }) => None,
    }
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Manifold> {
    let delta = pb - pa;
    let dist = delta.length();
    let penetration = ra + rb - dist;
    if penetration <= -CONTACT_MARGIN {
        return None;
    }
    // Coincident centers: pick an arbitrary but stable axis
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };
    Some(Manifold {
        normal,
        penetration,
        point: pa + normal * ra,
    })
}

/// Normal points from the box toward the circle
fn rect_circle(rect_pos: Vec2, size: Vec2, circle_pos: Vec2, radius: f32) -> Option<Manifold> {
    let half = size / 2.0;
    let local = circle_pos - rect_pos;
    let clamped = local.clamp(-half, half);

    if local == clamped {
        // Circle center inside the box: push out through the nearest face
        let dx = half.x - local.x.abs();
        let dy = half.y - local.y.abs();
        let (normal, depth) = if dx < dy {
            (Vec2::new(local.x.signum(), 0.0), dx)
        } else {
            (Vec2::new(0.0, local.y.signum()), dy)
        };
        return Some(Manifold {
            normal,
            penetration: radius + depth,
            point: rect_pos + clamped,
        });
    }

    let diff = local - clamped;
    let dist = diff.length();
    let penetration = radius - dist;
    if penetration <= -CONTACT_MARGIN {
        return None;
    }
    Some(Manifold {
        normal: diff / dist,
        penetration,
        point: rect_pos + clamped,
    })
}

fn rect_rect(pa: Vec2, sa: Vec2, pb: Vec2, sb: Vec2) -> Option<Manifold> {
    let delta = pb - pa;
    let overlap = (sa + sb) / 2.0 - delta.abs();
    if overlap.x <= -CONTACT_MARGIN || overlap.y <= -CONTACT_MARGIN {
        return None;
    }
    let (normal, penetration) = if overlap.x < overlap.y {
        (Vec2::new(delta.x.signum(), 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, delta.y.signum()), overlap.y)
    };
    Some(Manifold {
        normal,
        penetration,
        point: pa + delta / 2.0,
    })
}

/// Contained body against the inside of a loop spanning `origin..origin + size`.
/// The normal points back into the loop.
fn edge_loop_box(origin: Vec2, size: Vec2, center: Vec2, half: Vec2) -> Option<Manifold> {
    let max = origin + size;
    // Only bodies whose center is inside are kept in
    if center.x < origin.x || center.y < origin.y || center.x > max.x || center.y > max.y {
        return None;
    }

    let walls = [
        (origin.x - (center.x - half.x), Vec2::X),
        ((center.x + half.x) - max.x, Vec2::NEG_X),
        (origin.y - (center.y - half.y), Vec2::Y),
        ((center.y + half.y) - max.y, Vec2::NEG_Y),
    ];
    let (penetration, normal) = walls
        .into_iter()
        .max_by(|(pa, _), (pb, _)| pa.total_cmp(pb))?;
    if penetration <= -CONTACT_MARGIN {
        return None;
    }
    Some(Manifold {
        normal,
        penetration,
        point: center - normal * half,
    })
}

/// Apply the contact impulse along the normal. Returns its magnitude.
fn resolve_velocity(
    a: &mut PhysicsBody,
    b: &mut PhysicsBody,
    inv_a: f32,
    inv_b: f32,
    manifold: &Manifold,
) -> f32 {
    let relative = b.velocity - a.velocity;
    let along_normal = relative.dot(manifold.normal);
    if along_normal >= 0.0 {
        // Already separating
        return 0.0;
    }

    let restitution = if -along_normal < RESTING_SPEED {
        0.0
    } else {
        a.restitution.min(b.restitution)
    };
    let j = -(1.0 + restitution) * along_normal / (inv_a + inv_b);
    a.velocity -= manifold.normal * (j * inv_a);
    b.velocity += manifold.normal * (j * inv_b);
    j
}

/// Steps every node that carries a body
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    /// Points/s²
    pub gravity: Vec2,
    /// Pairs touching after the last step
    touching: HashSet<(NodeId, NodeId)>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, GRAVITY),
            touching: HashSet::new(),
        }
    }
}

impl PhysicsWorld {
    /// Advance the simulation by `dt`, returning contacts that began
    pub fn step(&mut self, nodes: &mut [Node], dt: f32) -> Vec<Contact> {
        for node in nodes.iter_mut() {
            if let Some(body) = node.body.as_mut().filter(|b| b.dynamic) {
                body.velocity += self.gravity * dt;
            }
        }

        let mut touching_now = HashSet::new();
        let mut contacts = Vec::new();

        for j in 1..nodes.len() {
            let (left, right) = nodes.split_at_mut(j);
            let b = &mut right[0];
            for a in left.iter_mut() {
                let (Some(body_a), Some(body_b)) = (a.body.as_mut(), b.body.as_mut()) else {
                    continue;
                };
                let inv_a = body_a.inverse_mass();
                let inv_b = body_b.inverse_mass();
                if inv_a + inv_b == 0.0 {
                    // Two immovable bodies never interact
                    continue;
                }
                let Some(manifold) = collide(&body_a.shape, a.position, &body_b.shape, b.position)
                else {
                    continue;
                };

                let impulse = resolve_velocity(body_a, body_b, inv_a, inv_b, &manifold);

                if manifold.penetration > POSITION_SLOP {
                    let correction = manifold.normal
                        * ((manifold.penetration - POSITION_SLOP) * POSITION_CORRECTION
                            / (inv_a + inv_b));
                    a.position -= correction * inv_a;
                    b.position += correction * inv_b;
                }

                let key = (a.id, b.id);
                if !self.touching.contains(&key) {
                    contacts.push(Contact {
                        a: a.id,
                        b: b.id,
                        point: manifold.point,
                        normal: manifold.normal,
                        collision_impulse: impulse,
                    });
                }
                touching_now.insert(key);
            }
        }

        for node in nodes.iter_mut() {
            if let Some(body) = node.body.as_ref().filter(|b| b.dynamic) {
                node.position += body.velocity * dt;
            }
        }

        self.touching = touching_now;
        contacts
    }
}
