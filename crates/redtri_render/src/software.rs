//! Software render target
//!
//! A CPU rasterizer with a front and back buffer. It needs no display or GPU,
//! which makes it the rendering context for headless runs and tests.
//!
//! Rasterization samples pixel centers against edge functions and applies the
//! top-left fill rule, so triangles sharing an edge never both cover a pixel.
//! Both windings are filled, and vertex colors are interpolated across the
//! triangle.

use image::{Rgba, RgbaImage};

use crate::target::{RenderError, RenderTarget};
use crate::types::{color_to_rgba8, ColoredVertex};

/// Whether drawing goes to a hidden back buffer or straight to the front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffering {
    Single,
    Double,
}

/// Command counts since the framebuffer was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub clears: usize,
    pub draws: usize,
    pub presents: usize,
}

/// Double-buffered RGBA8 framebuffer
pub struct Framebuffer {
    front: RgbaImage,
    back: RgbaImage,
    buffering: Buffering,
    stats: FrameStats,
}

impl Framebuffer {
    /// Create a framebuffer; both buffers start zeroed
    pub fn new(width: u32, height: u32, buffering: Buffering) -> Self {
        Self {
            front: RgbaImage::new(width, height),
            back: RgbaImage::new(width, height),
            buffering,
            stats: FrameStats::default(),
        }
    }

    /// The visible image
    pub fn front(&self) -> &RgbaImage {
        &self.front
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    fn draw_buffer(&mut self) -> &mut RgbaImage {
        match self.buffering {
            Buffering::Double => &mut self.back,
            Buffering::Single => &mut self.front,
        }
    }
}

impl RenderTarget for Framebuffer {
    fn size(&self) -> (u32, u32) {
        self.front.dimensions()
    }

    fn clear(&mut self, color: [f32; 4]) {
        let pixel = Rgba(color_to_rgba8(color));
        for p in self.draw_buffer().pixels_mut() {
            *p = pixel;
        }
        self.stats.clears += 1;
    }

    fn draw_triangles(&mut self, vertices: &[ColoredVertex]) {
        let buffer = self.draw_buffer();
        for tri in vertices.chunks_exact(3) {
            rasterize_triangle(buffer, [tri[0], tri[1], tri[2]]);
        }
        self.stats.draws += 1;
    }

    fn present(&mut self) -> Result<(), RenderError> {
        if self.buffering == Buffering::Double {
            std::mem::swap(&mut self.front, &mut self.back);
        }
        self.stats.presents += 1;
        Ok(())
    }
}

/// Map an NDC position to pixel space (row 0 at the top)
pub fn ndc_to_pixel(position: [f32; 2], width: u32, height: u32) -> [f32; 2] {
    [
        (position[0] + 1.0) * 0.5 * width as f32,
        (1.0 - position[1]) * 0.5 * height as f32,
    ]
}

/// Signed area term of `p` relative to the directed edge `a -> b`
fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Top-left rule for an edge of a triangle with positive `edge` area in y-down space
fn is_top_left(a: [f32; 2], b: [f32; 2]) -> bool {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dy == 0.0 && dx > 0.0) || dy < 0.0
}

fn covers(w: f32, top_left: bool) -> bool {
    w > 0.0 || (w == 0.0 && top_left)
}

fn rasterize_triangle(buffer: &mut RgbaImage, tri: [ColoredVertex; 3]) {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let mut p = tri.map(|v| ndc_to_pixel(v.position, width, height));
    let mut c = tri.map(|v| v.color);

    let mut area = edge(p[0], p[1], p[2]);
    if area == 0.0 || !area.is_finite() {
        return;
    }
    if area < 0.0 {
        p.swap(1, 2);
        c.swap(1, 2);
        area = -area;
    }

    let min_x = p.iter().map(|q| q[0]).fold(f32::INFINITY, f32::min);
    let max_x = p.iter().map(|q| q[0]).fold(f32::NEG_INFINITY, f32::max);
    let min_y = p.iter().map(|q| q[1]).fold(f32::INFINITY, f32::min);
    let max_y = p.iter().map(|q| q[1]).fold(f32::NEG_INFINITY, f32::max);

    let x0 = (min_x - 0.5).floor().max(0.0) as u32;
    let y0 = (min_y - 0.5).floor().max(0.0) as u32;
    let x1 = ((max_x - 0.5).ceil().max(0.0) as u32).min(width - 1);
    let y1 = ((max_y - 0.5).ceil().max(0.0) as u32).min(height - 1);

    let tl = [
        is_top_left(p[1], p[2]),
        is_top_left(p[2], p[0]),
        is_top_left(p[0], p[1]),
    ];

    for y in y0..=y1 {
        for x in x0..=x1 {
            let center = [x as f32 + 0.5, y as f32 + 0.5];
            let w0 = edge(p[1], p[2], center);
            let w1 = edge(p[2], p[0], center);
            let w2 = edge(p[0], p[1], center);

            if !(covers(w0, tl[0]) && covers(w1, tl[1]) && covers(w2, tl[2])) {
                continue;
            }

            let (l0, l1, l2) = (w0 / area, w1 / area, w2 / area);
            let mut color = [0.0f32; 4];
            for (i, channel) in color.iter_mut().enumerate() {
                *channel = c[0][i] * l0 + c[1][i] * l1 + c[2][i] * l2;
            }
            buffer.put_pixel(x, y, Rgba(color_to_rgba8(color)));
        }
    }
}
