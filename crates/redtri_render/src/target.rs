//! Render target abstraction
//!
//! A render target is the graphics device as seen by the immediate-mode layer:
//! it accepts clears and triangle batches for the frame being drawn, and
//! `present` makes that frame visible.

use crate::types::ColoredVertex;

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// Surface no longer matches the window and must be reconfigured
    SurfaceOutdated,
    /// GPU out of memory
    OutOfMemory,
    /// Acquiring the next frame timed out
    Timeout,
    /// Other surface or device error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::SurfaceOutdated => write!(f, "Surface outdated"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Timeout => write!(f, "Timed out acquiring frame"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost => RenderError::SurfaceLost,
            wgpu::SurfaceError::Outdated => RenderError::SurfaceOutdated,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            other => RenderError::Other(format!("{:?}", other)),
        }
    }
}

/// Sink for immediate-mode drawing commands
pub trait RenderTarget {
    /// Current drawable size in pixels (the viewport)
    fn size(&self) -> (u32, u32);

    /// Fill the whole back buffer with `color`
    fn clear(&mut self, color: [f32; 4]);

    /// Draw a triangle list; `vertices.len()` is a multiple of 3
    fn draw_triangles(&mut self, vertices: &[ColoredVertex]);

    /// Make the drawn frame visible
    fn present(&mut self) -> Result<(), RenderError>;
}
