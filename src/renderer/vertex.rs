//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
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

/// Build an opaque color from 8-bit channels
pub const fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Same color with a different alpha
pub const fn with_alpha(c: [f32; 4], a: f32) -> [f32; 4] {
    [c[0], c[1], c[2], a]
}

/// Shared palette
pub mod colors {
    use super::rgb;

    pub const BACKGROUND: [f32; 4] = rgb(0, 0, 0);
    pub const WHITE: [f32; 4] = rgb(255, 255, 255);
    pub const BLACK: [f32; 4] = rgb(0, 0, 0);
    pub const GRAY: [f32; 4] = rgb(128, 128, 128);
    pub const DARK_GRAY: [f32; 4] = rgb(50, 50, 50);
    pub const RED: [f32; 4] = rgb(255, 0, 0);
    pub const GREEN: [f32; 4] = rgb(0, 255, 0);
    pub const BLUE: [f32; 4] = rgb(0, 0, 255);
    pub const YELLOW: [f32; 4] = rgb(255, 255, 0);
    pub const PURPLE: [f32; 4] = rgb(128, 0, 128);
    pub const ORANGE: [f32; 4] = rgb(255, 165, 0);
    pub const SKY: [f32; 4] = rgb(135, 206, 235);
}
