//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Flat colors standing in for sprite textures
pub mod colors {
    pub const SKY: [f32; 4] = [0.45, 0.7, 0.95, 1.0];
    pub const GROUND: [f32; 4] = [0.35, 0.25, 0.15, 1.0];
    pub const PLATFORM: [f32; 4] = [0.55, 0.4, 0.25, 1.0];
    pub const TRUNK: [f32; 4] = [0.4, 0.26, 0.13, 1.0];
    pub const LEAVES: [f32; 4] = [0.2, 0.55, 0.2, 1.0];
    pub const ORANGE: [f32; 4] = [1.0, 0.55, 0.0, 1.0];
    pub const SUN: [f32; 4] = [1.0, 0.85, 0.2, 1.0];
    pub const SUN_HALO: [f32; 4] = [1.0, 0.9, 0.4, 0.35];
    pub const SKULL: [f32; 4] = [0.92, 0.9, 0.85, 1.0];
    pub const SKULL_EYES: [f32; 4] = [0.1, 0.1, 0.1, 1.0];
    pub const CLEAR: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
}
