//! GPU-compatible vertex types
//!
//! These types match the vertex layout of `shaders/triangle.wgsl`.

use bytemuck::{Pod, Zeroable};

/// A 2D vertex in normalized device coordinates with an RGBA color
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColoredVertex {
    /// Position in NDC, visible range [-1, 1] on both axes
    pub position: [f32; 2],
    /// RGBA color, each channel in [0, 1]
    pub color: [f32; 4],
}

impl ColoredVertex {
    pub fn new(position: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Convert a float color channel to an 8-bit unorm value
pub fn channel_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert an RGBA float color to 8-bit unorm channels
pub fn color_to_rgba8(color: [f32; 4]) -> [u8; 4] {
    [
        channel_to_u8(color[0]),
        channel_to_u8(color[1]),
        channel_to_u8(color[2]),
        channel_to_u8(color[3]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<ColoredVertex>(), 24);
    }

    #[test]
    fn test_color_conversion_clamps() {
        assert_eq!(color_to_rgba8([1.0, 0.0, 0.5, 2.0]), [255, 0, 128, 255]);
        assert_eq!(channel_to_u8(-1.0), 0);
    }
}
