//! Shape generation for 2D primitives
//!
//! Everything is emitted in scene coordinates; the pipeline maps to NDC.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::{GameScene, LineShape, Node, NodeKind, Shape, Visual};

const CIRCLE_SEGMENTS: u32 = 24;
const CAP_SEGMENTS: u32 = 10;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Half disc on the side of `center` that `facing` points to
fn half_circle(center: Vec2, radius: f32, facing: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let start = facing.to_angle() - PI / 2.0;
    let mut vertices = Vec::with_capacity((CAP_SEGMENTS * 3) as usize);
    for i in 0..CAP_SEGMENTS {
        let t1 = start + PI * i as f32 / CAP_SEGMENTS as f32;
        let t2 = start + PI * (i + 1) as f32 / CAP_SEGMENTS as f32;
        let p1 = center + Vec2::from_angle(t1) * radius;
        let p2 = center + Vec2::from_angle(t2) * radius;
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
    }
    vertices
}

/// Axis-aligned filled rectangle centred on `center`
pub fn rect(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let min = center - size / 2.0;
    let max = center + size / 2.0;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, max.y, color),
    ]
}

/// Thick segment with round caps
pub fn line(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let radius = width / 2.0;
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        // Zero length: just the two caps, i.e. a dot
        return circle(from, radius, color, CAP_SEGMENTS * 2);
    }
    let perp = Vec2::new(-dir.y, dir.x) * radius;

    let a1 = from + perp;
    let a2 = from - perp;
    let b1 = to + perp;
    let b2 = to - perp;

    let mut vertices = vec![
        Vertex::new(a1.x, a1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b2.x, b2.y, color),
    ];
    vertices.extend(half_circle(from, radius, -dir, color));
    vertices.extend(half_circle(to, radius, dir, color));
    vertices
}

fn with_alpha(mut color: [f32; 4], alpha: f32) -> [f32; 4] {
    color[3] *= alpha;
    color
}

/// Stand-in artwork for a textured node
fn sprite(node: &Node) -> Vec<Vertex> {
    let center = node.position;
    let size = node.size;
    match node.kind {
        NodeKind::Background => rect(center, size, colors::SKY),
        NodeKind::Tree => {
            let trunk = Vec2::new(size.x * 0.2, size.y * 0.5);
            let mut v = rect(center - Vec2::new(0.0, size.y * 0.25), trunk, colors::TRUNK);
            v.extend(circle(
                center + Vec2::new(0.0, size.y * 0.1),
                size.x.min(size.y) * 0.5,
                colors::LEAVES,
                CIRCLE_SEGMENTS,
            ));
            v
        }
        NodeKind::Sun => {
            let radius = size.x.min(size.y) / 2.0;
            let mut v = circle(center, radius, colors::SUN_HALO, CIRCLE_SEGMENTS);
            v.extend(circle(center, radius * 0.7, colors::SUN, CIRCLE_SEGMENTS));
            v
        }
        NodeKind::Orange => circle(center, size.x / 2.0, colors::ORANGE, CIRCLE_SEGMENTS),
        NodeKind::Skull => {
            let radius = size.x.min(size.y) / 2.0;
            let eye = radius * 0.2;
            let mut v = circle(center, radius, colors::SKULL, CIRCLE_SEGMENTS);
            for side in [-1.0, 1.0] {
                v.extend(circle(
                    center + Vec2::new(side * radius * 0.35, radius * 0.1),
                    eye,
                    colors::SKULL_EYES,
                    8,
                ));
            }
            v
        }
        NodeKind::Ground | NodeKind::Decoration => body_outline(node).unwrap_or_default(),
        NodeKind::AimLine | NodeKind::Boundary | NodeKind::Explosion => Vec::new(),
    }
}

/// Solid fill for an untextured body
fn body_outline(node: &Node) -> Option<Vec<Vertex>> {
    let body = node.body.as_ref()?;
    let color = match node.kind {
        NodeKind::Ground => colors::GROUND,
        _ => colors::PLATFORM,
    };
    match body.shape {
        Shape::Rect { size } => Some(rect(node.position, size, color)),
        Shape::Circle { radius } => Some(circle(node.position, radius, color, CIRCLE_SEGMENTS)),
        Shape::EdgeLoop { .. } => None,
    }
}

fn aim_line(shape: &LineShape) -> Vec<Vertex> {
    match shape.path {
        Some((from, to)) => line(from, to, shape.width, shape.color),
        None => Vec::new(),
    }
}

/// Vertices for the whole scene, back to front
pub fn scene_vertices(game: &GameScene) -> Vec<Vertex> {
    let mut order: Vec<&Node> = game.scene.nodes().iter().collect();
    // Stable: insertion order breaks z ties
    order.sort_by(|a, b| a.z.total_cmp(&b.z));

    let mut vertices = Vec::new();
    for node in order {
        match &node.visual {
            Visual::Sprite { .. } => vertices.extend(sprite(node)),
            Visual::Line(shape) => vertices.extend(aim_line(shape)),
            Visual::Emitter(emitter) => {
                for particle in &emitter.particles {
                    let color = with_alpha(emitter.color, particle.life.clamp(0.0, 1.0));
                    vertices.extend(rect(
                        node.position + particle.offset,
                        Vec2::splat(particle.size),
                        color,
                    ));
                }
            }
            Visual::None => {
                if let Some(fill) = body_outline(node) {
                    vertices.extend(fill);
                }
            }
        }
    }
    vertices
}
