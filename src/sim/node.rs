//! Scene graph
//!
//! A flat arena of nodes kept in insertion order. Later nodes draw on top of
//! earlier ones at equal `z`. Ids are never reused within a scene.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use super::effects::Emitter;
use super::physics::{Contact, PhysicsWorld};

/// Stable node handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// What a node is, assigned when it is spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Background,
    Tree,
    Sun,
    Skull,
    Ground,
    Orange,
    AimLine,
    Boundary,
    Explosion,
    Decoration,
}

impl NodeKind {
    /// Destroyed by a hard enough impact
    pub fn breaks_on_impact(self) -> bool {
        match self {
            NodeKind::Skull => true,
            NodeKind::Background
            | NodeKind::Tree
            | NodeKind::Sun
            | NodeKind::Ground
            | NodeKind::Orange
            | NodeKind::AimLine
            | NodeKind::Boundary
            | NodeKind::Explosion
            | NodeKind::Decoration => false,
        }
    }
}

/// Stroked line, used for the aim line
#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    /// `None` draws nothing
    pub path: Option<(Vec2, Vec2)>,
    pub width: f32,
    pub color: [f32; 4],
}

/// How a node is drawn
#[derive(Debug, Clone)]
pub enum Visual {
    None,
    Sprite { texture: String },
    Line(LineShape),
    Emitter(Emitter),
}

/// A scene node
#[derive(Debug, Clone)]
pub struct Node {
    /// Assigned by [`Scene::add_child`]
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Vec2,
    /// Frame size used for hit testing (zero = never hit)
    pub size: Vec2,
    pub z: f32,
    pub body: Option<PhysicsBody>,
    pub visual: Visual,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId(0),
            kind,
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            z: 0.0,
            body: None,
            visual: Visual::None,
        }
    }

    pub fn sprite(kind: NodeKind, texture: &str, size: Vec2) -> Self {
        Self {
            size,
            visual: Visual::Sprite {
                texture: texture.to_string(),
            },
            ..Self::new(kind)
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    /// Whether `point` falls inside this node's frame (centered on position)
    pub fn frame_contains(&self, point: Vec2) -> bool {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return false;
        }
        let half = self.size / 2.0;
        let d = (point - self.position).abs();
        d.x <= half.x && d.y <= half.y
    }

    pub fn is_dynamic(&self) -> bool {
        self.body.as_ref().is_some_and(|b| b.dynamic)
    }
}

/// Pending "remove after delay" action
#[derive(Debug, Clone, Copy)]
struct DelayedRemoval {
    node: NodeId,
    remaining: f32,
}

/// Timers below this count as expired (absorbs fixed-step rounding)
const TIMER_EPSILON: f32 = 1e-4;

/// The node arena plus its physics world
#[derive(Debug, Clone)]
pub struct Scene {
    /// Scene size in points, centered on the origin
    pub size: Vec2,
    pub physics: PhysicsWorld,
    nodes: Vec<Node>,
    removals: Vec<DelayedRemoval>,
    next_id: u32,
}

impl Scene {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            physics: PhysicsWorld::default(),
            nodes: Vec::new(),
            removals: Vec::new(),
            next_id: 1,
        }
    }

    /// Attach a node, returning its newly assigned id
    pub fn add_child(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = id;
        self.nodes.push(node);
        id
    }

    /// Detach a node. Returns it if it was still attached.
    pub fn remove_from_parent(&mut self, id: NodeId) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(index))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first_of_kind(&self, kind: NodeKind) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind == kind)
    }

    pub fn count_of_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// Every node whose frame contains `point`, topmost first
    pub fn nodes_at(&self, point: Vec2) -> Vec<NodeId> {
        let mut hits: Vec<(usize, &Node)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.frame_contains(point))
            .collect();
        // Higher z first, then later insertion first
        hits.sort_by(|(ia, a), (ib, b)| b.z.total_cmp(&a.z).then(ib.cmp(ia)));
        hits.into_iter().map(|(_, n)| n.id).collect()
    }

    /// Topmost node at `point`; `None` means the scene itself was hit
    pub fn node_at(&self, point: Vec2) -> Option<NodeId> {
        self.nodes_at(point).into_iter().next()
    }

    /// Schedule `id` for removal after `delay` seconds. Cannot be cancelled.
    pub fn remove_after(&mut self, id: NodeId, delay: f32) {
        self.removals.push(DelayedRemoval {
            node: id,
            remaining: delay,
        });
    }

    /// Advance delayed actions, returning the nodes they removed
    pub fn advance_actions(&mut self, dt: f32) -> Vec<NodeId> {
        let mut due = Vec::new();
        self.removals.retain_mut(|action| {
            action.remaining -= dt;
            if action.remaining <= TIMER_EPSILON {
                due.push(action.node);
                false
            } else {
                true
            }
        });

        due.into_iter()
            .filter(|&id| self.remove_from_parent(id).is_some())
            .collect()
    }

    /// Step the physics world over all attached nodes
    pub fn step_physics(&mut self, dt: f32) -> Vec<Contact> {
        self.physics.step(&mut self.nodes, dt)
    }
}
