//! Level documents, textures and particle definitions
//!
//! Levels are JSON documents describing the nodes of a scene. The catalog
//! maps texture names to sprite sizes and emitter names to burst parameters.
//! The three shipped levels and the catalog are embedded in the binary.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::body::{PhysicsBody, Shape};
use crate::sim::node::NodeKind;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");
const BUILTIN_LEVELS: [(&str, &str); 3] = [
    ("Level-1", include_str!("../assets/levels/Level-1.json")),
    ("Level-2", include_str!("../assets/levels/Level-2.json")),
    ("Level-3", include_str!("../assets/levels/Level-3.json")),
];

/// Errors raised while loading asset documents
#[derive(Debug)]
pub enum AssetError {
    /// The document is not valid JSON for its type
    Parse {
        name: String,
        source: serde_json::Error,
    },
    /// The level parsed but describes something unusable
    InvalidLevel { name: String, reason: String },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Parse { name, source } => write!(f, "failed to parse {name}: {source}"),
            AssetError::InvalidLevel { name, reason } => {
                write!(f, "invalid level {name}: {reason}")
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Parse { source, .. } => Some(source),
            AssetError::InvalidLevel { .. } => None,
        }
    }
}

/// A sprite image; only its size matters to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub size: Vec2,
}

/// Burst particle effect parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterDef {
    pub particle_count: u32,
    /// Seconds each particle lives
    pub lifetime: f32,
    /// Mean launch speed (points/s)
    pub speed: f32,
    /// Launch speed varies by ± this amount
    #[serde(default)]
    pub speed_range: f32,
    pub size: f32,
    pub color: [f32; 4],
}

/// Texture and emitter catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub textures: HashMap<String, Texture>,
    #[serde(default)]
    pub emitters: HashMap<String, EmitterDef>,
}

fn default_true() -> bool {
    true
}

/// Physics body description inside a level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyDoc {
    pub shape: Shape,
    #[serde(default = "default_true")]
    pub dynamic: bool,
    #[serde(default)]
    pub restitution: Option<f32>,
}

impl BodyDoc {
    pub fn to_body(&self) -> PhysicsBody {
        let mut body = PhysicsBody::new(self.shape);
        body.dynamic = self.dynamic && !body.is_edge_loop();
        if let Some(restitution) = self.restitution {
            body.restitution = restitution;
        }
        body
    }
}

/// One node placed by a level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDoc {
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Vec2,
    /// Falls back to the texture size when zero
    #[serde(default)]
    pub size: Vec2,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub z: f32,
    #[serde(default)]
    pub body: Option<BodyDoc>,
}

/// A level document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDoc {
    /// Scene size in points
    pub size: Vec2,
    pub nodes: Vec<NodeDoc>,
}

impl LevelDoc {
    /// Reject levels that would produce degenerate scenes or bodies
    pub fn validate(&self, name: &str) -> Result<(), AssetError> {
        let invalid = |reason: String| AssetError::InvalidLevel {
            name: name.to_string(),
            reason,
        };

        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Err(invalid(format!("scene size {:?} must be positive", self.size)));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            let Some(body) = &node.body else { continue };
            let ok = match body.shape {
                Shape::Circle { radius } => radius > 0.0,
                Shape::Rect { size } | Shape::EdgeLoop { size } => size.x > 0.0 && size.y > 0.0,
            };
            if !ok {
                return Err(invalid(format!("node {i} ({:?}) has a degenerate body", node.kind)));
            }
        }
        Ok(())
    }
}

/// All loadable resources, looked up by name
#[derive(Debug, Clone, Default)]
pub struct LevelLibrary {
    catalog: Catalog,
    levels: HashMap<String, LevelDoc>,
}

impl LevelLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the embedded catalog and levels
    pub fn builtin() -> Result<Self, AssetError> {
        let library = Self::from_json(BUILTIN_CATALOG, &BUILTIN_LEVELS)?;
        log::debug!(
            "Built-in library: {} textures, {} emitters, {} levels",
            library.catalog.textures.len(),
            library.catalog.emitters.len(),
            library.levels.len()
        );
        Ok(library)
    }

    /// Library from a catalog document and `(name, document)` level pairs
    pub fn from_json(catalog: &str, levels: &[(&str, &str)]) -> Result<Self, AssetError> {
        let mut library = Self::new();
        library.load_catalog_json("catalog", catalog)?;
        for (name, json) in levels {
            library.load_level_json(name, json)?;
        }
        Ok(library)
    }

    /// Resource name of a numbered level
    pub fn level_name(level: u32) -> String {
        format!("Level-{level}")
    }

    /// Merge a catalog document into the library
    pub fn load_catalog_json(&mut self, name: &str, json: &str) -> Result<(), AssetError> {
        let catalog: Catalog = serde_json::from_str(json).map_err(|source| AssetError::Parse {
            name: name.to_string(),
            source,
        })?;
        self.catalog.textures.extend(catalog.textures);
        self.catalog.emitters.extend(catalog.emitters);
        Ok(())
    }

    /// Parse, validate and register a level under `name`
    pub fn load_level_json(&mut self, name: &str, json: &str) -> Result<(), AssetError> {
        let level: LevelDoc = serde_json::from_str(json).map_err(|source| AssetError::Parse {
            name: name.to_string(),
            source,
        })?;
        level.validate(name)?;
        self.add_level(name, level);
        Ok(())
    }

    pub fn add_texture(&mut self, name: &str, texture: Texture) {
        self.catalog.textures.insert(name.to_string(), texture);
    }

    pub fn add_emitter(&mut self, name: &str, emitter: EmitterDef) {
        self.catalog.emitters.insert(name.to_string(), emitter);
    }

    pub fn add_level(&mut self, name: &str, level: LevelDoc) {
        self.levels.insert(name.to_string(), level);
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.catalog.textures.get(name)
    }

    pub fn emitter(&self, name: &str) -> Option<&EmitterDef> {
        self.catalog.emitters.get(name)
    }

    pub fn level(&self, name: &str) -> Option<&LevelDoc> {
        self.levels.get(name)
    }
}
