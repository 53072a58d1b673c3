//! The orange: a sprite wrapped in a circular body

use crate::assets::Texture;
use crate::consts::ORANGE_TEXTURE;

use super::body::PhysicsBody;
use super::node::{Node, NodeKind};

/// Build an unattached orange sized to `texture`.
///
/// The collider radius matches the visual radius (half the sprite width).
pub fn orange(texture: &Texture) -> Node {
    let radius = texture.size.x / 2.0;
    Node::sprite(NodeKind::Orange, ORANGE_TEXTURE, texture.size)
        .with_body(PhysicsBody::circle(radius))
        .with_z(3.0)
}
