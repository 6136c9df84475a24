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

/// `0xRRGGBB` plus alpha as RGBA floats
pub const fn hex(rgb: u32, alpha: f32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Colors for game elements
pub mod colors {
    use super::hex;

    pub const BACKGROUND: [f32; 4] = hex(0x0a0a0c, 1.0);
    pub const GRID: [f32; 4] = hex(0x1a1a1e, 1.0);
    pub const WORLD_BORDER: [f32; 4] = hex(0x374151, 1.0);
    pub const OBSTACLE_FILL: [f32; 4] = hex(0x111827, 1.0);
    pub const OBSTACLE_OUTLINE: [f32; 4] = hex(0x1f2937, 1.0);
    pub const CAR_PRIMARY: [f32; 4] = hex(0x3b82f6, 1.0); // blue-500
    pub const CAR_SECONDARY: [f32; 4] = hex(0x10b981, 1.0); // emerald-500
    pub const WINDOW: [f32; 4] = [0.0, 0.0, 0.0, 0.4];
    pub const HEADLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.8];
    pub const HEADLIGHT_GLOW: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const TAILLIGHT: [f32; 4] = [1.0, 0.0, 0.0, 0.8];
    pub const TAILLIGHT_GLOW: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        let c = colors::CAR_PRIMARY;
        assert!((c[0] - 0x3b as f32 / 255.0).abs() < 1e-6);
        assert!((c[2] - 0xf6 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);
    }
}
