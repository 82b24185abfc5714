//! Immediate-mode drawing layer
//!
//! `Gl` reproduces the fixed-function command model: vertices are emitted one
//! at a time between `begin` and `end`, each picking up the current color.
//! On `end` the batch is assembled into a triangle list and handed to the
//! bound [`RenderTarget`].
//!
//! Context state that outlives a frame (clear color, current color) lives in
//! [`GlState`], which the owner keeps across redraws.

use crate::target::{RenderError, RenderTarget};
use crate::types::ColoredVertex;

/// Primitive assembled from the vertices of one `begin`/`end` batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Independent triangles, every 3 vertices
    Triangles,
    /// Each vertex after the second forms a triangle with the previous two
    TriangleStrip,
    /// Each vertex after the second forms a triangle with the first and previous
    TriangleFan,
}

impl Primitive {
    /// Assemble batch vertices into a triangle list.
    ///
    /// Vertices that do not complete a triangle are dropped.
    pub fn assemble(self, vertices: &[ColoredVertex]) -> Vec<ColoredVertex> {
        match self {
            Primitive::Triangles => {
                let complete = vertices.len() - vertices.len() % 3;
                vertices[..complete].to_vec()
            }
            Primitive::TriangleStrip => {
                let mut out = Vec::with_capacity(vertices.len().saturating_sub(2) * 3);
                for (i, window) in vertices.windows(3).enumerate() {
                    // Odd triangles swap their first two vertices to keep winding
                    if i % 2 == 0 {
                        out.extend_from_slice(&[window[0], window[1], window[2]]);
                    } else {
                        out.extend_from_slice(&[window[1], window[0], window[2]]);
                    }
                }
                out
            }
            Primitive::TriangleFan => {
                let mut out = Vec::with_capacity(vertices.len().saturating_sub(2) * 3);
                if let Some((&hub, rest)) = vertices.split_first() {
                    for pair in rest.windows(2) {
                        out.extend_from_slice(&[hub, pair[0], pair[1]]);
                    }
                }
                out
            }
        }
    }
}

/// Invalid immediate-mode command sequence, or a failed present
#[derive(Debug)]
pub enum DrawError {
    /// `begin` called while a batch is already open
    BeginInsideBatch,
    /// `end` called with no open batch
    EndWithoutBegin,
    /// `vertex` called with no open batch
    VertexOutsideBatch,
    /// `clear` called while a batch is open
    ClearInsideBatch,
    /// `swap_buffers` called while a batch is open
    SwapInsideBatch,
    /// The redraw ended with a batch still open; its vertices were discarded
    UnterminatedBatch { vertices: usize },
    /// The target failed to present the frame
    Present(RenderError),
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::BeginInsideBatch => write!(f, "begin called inside begin/end"),
            DrawError::EndWithoutBegin => write!(f, "end called without begin"),
            DrawError::VertexOutsideBatch => write!(f, "vertex emitted outside begin/end"),
            DrawError::ClearInsideBatch => write!(f, "clear called inside begin/end"),
            DrawError::SwapInsideBatch => write!(f, "swap_buffers called inside begin/end"),
            DrawError::UnterminatedBatch { vertices } => {
                write!(f, "redraw ended inside begin/end ({} vertices discarded)", vertices)
            }
            DrawError::Present(err) => write!(f, "Present failed: {}", err),
        }
    }
}

impl std::error::Error for DrawError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DrawError::Present(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RenderError> for DrawError {
    fn from(err: RenderError) -> Self {
        DrawError::Present(err)
    }
}

/// Context state that persists across frames
#[derive(Debug, Clone, PartialEq)]
pub struct GlState {
    /// Color used by `clear`
    pub clear_color: [f32; 4],
    /// Color attached to the next emitted vertex
    pub current_color: [f32; 4],
}

impl Default for GlState {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            current_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl GlState {
    /// Set the clear color, clamping each channel to [0, 1]
    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.clear_color = [r, g, b, a].map(|c| c.clamp(0.0, 1.0));
    }
}

/// An open `begin`/`end` batch
struct Batch {
    primitive: Primitive,
    vertices: Vec<ColoredVertex>,
}

/// Immediate-mode command layer bound to one target for one redraw
pub struct Gl<'a> {
    state: &'a mut GlState,
    target: &'a mut dyn RenderTarget,
    batch: Option<Batch>,
}

impl<'a> Gl<'a> {
    pub fn new(state: &'a mut GlState, target: &'a mut dyn RenderTarget) -> Self {
        Self {
            state,
            target,
            batch: None,
        }
    }

    /// Clear the color buffer to the configured clear color
    pub fn clear(&mut self) -> Result<(), DrawError> {
        if self.batch.is_some() {
            return Err(DrawError::ClearInsideBatch);
        }
        self.target.clear(self.state.clear_color);
        Ok(())
    }

    /// Open a primitive batch
    pub fn begin(&mut self, primitive: Primitive) -> Result<(), DrawError> {
        if self.batch.is_some() {
            return Err(DrawError::BeginInsideBatch);
        }
        self.batch = Some(Batch {
            primitive,
            vertices: Vec::new(),
        });
        Ok(())
    }

    /// Set the current color to an opaque RGB value
    pub fn color3f(&mut self, r: f32, g: f32, b: f32) {
        self.color4f(r, g, b, 1.0);
    }

    /// Set the current color
    pub fn color4f(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state.current_color = [r, g, b, a];
    }

    /// Emit a vertex with the current color
    pub fn vertex2f(&mut self, x: f32, y: f32) -> Result<(), DrawError> {
        let color = self.state.current_color;
        let batch = self.batch.as_mut().ok_or(DrawError::VertexOutsideBatch)?;
        batch.vertices.push(ColoredVertex::new([x, y], color));
        Ok(())
    }

    /// Close the batch and draw it
    pub fn end(&mut self) -> Result<(), DrawError> {
        let batch = self.batch.take().ok_or(DrawError::EndWithoutBegin)?;
        let triangles = batch.primitive.assemble(&batch.vertices);

        if triangles.len() < batch.vertices.len() && batch.primitive == Primitive::Triangles {
            log::debug!(
                "Dropped {} trailing vertices from incomplete triangle",
                batch.vertices.len() - triangles.len()
            );
        }

        if !triangles.is_empty() {
            self.target.draw_triangles(&triangles);
        }
        Ok(())
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) -> Result<(), DrawError> {
        if self.batch.is_some() {
            return Err(DrawError::SwapInsideBatch);
        }
        self.target.present()?;
        Ok(())
    }

    /// End the redraw; fails if a batch is still open
    pub fn finish(mut self) -> Result<(), DrawError> {
        match self.batch.take() {
            Some(batch) => Err(DrawError::UnterminatedBatch {
                vertices: batch.vertices.len(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Target that records every command it receives
    #[derive(Default)]
    struct RecordingTarget {
        clears: Vec<[f32; 4]>,
        batches: Vec<Vec<ColoredVertex>>,
        presents: usize,
    }

    impl RenderTarget for RecordingTarget {
        fn size(&self) -> (u32, u32) {
            (8, 8)
        }

        fn clear(&mut self, color: [f32; 4]) {
            self.clears.push(color);
        }

        fn draw_triangles(&mut self, vertices: &[ColoredVertex]) {
            self.batches.push(vertices.to_vec());
        }

        fn present(&mut self) -> Result<(), RenderError> {
            self.presents += 1;
            Ok(())
        }
    }

    fn v(x: f32) -> ColoredVertex {
        ColoredVertex::new([x, 0.0], [1.0; 4])
    }

    #[test]
    fn test_triangle_batch_reaches_target() {
        let mut state = GlState::default();
        state.set_clear_color(0.0, 0.0, 0.0, 1.0);
        let mut target = RecordingTarget::default();
        {
            let mut gl = Gl::new(&mut state, &mut target);
            gl.clear().unwrap();
            gl.begin(Primitive::Triangles).unwrap();
            gl.color3f(1.0, 0.0, 0.0);
            gl.vertex2f(-0.5, -0.5).unwrap();
            gl.vertex2f(0.5, -0.5).unwrap();
            gl.vertex2f(0.0, 0.5).unwrap();
            gl.end().unwrap();
            gl.swap_buffers().unwrap();
        }

        assert_eq!(target.clears, vec![[0.0, 0.0, 0.0, 1.0]]);
        assert_eq!(target.batches.len(), 1);
        assert_eq!(target.presents, 1);
        let batch = &target.batches[0];
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
        assert_eq!(batch[2].position, [0.0, 0.5]);
    }

    #[test]
    fn test_current_color_persists_across_frames() {
        let mut state = GlState::default();
        let mut target = RecordingTarget::default();
        Gl::new(&mut state, &mut target).color3f(0.0, 1.0, 0.0);

        let mut gl = Gl::new(&mut state, &mut target);
        gl.begin(Primitive::Triangles).unwrap();
        for x in [0.0, 1.0, 2.0] {
            gl.vertex2f(x, 0.0).unwrap();
        }
        gl.end().unwrap();
        assert_eq!(target.batches[0][0].color, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_default_color_is_white() {
        assert_eq!(GlState::default().current_color, [1.0; 4]);
    }

    #[test]
    fn test_clear_color_is_clamped() {
        let mut state = GlState::default();
        state.set_clear_color(-1.0, 0.5, 2.0, 1.0);
        assert_eq!(state.clear_color, [0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_invalid_command_sequences() {
        let mut state = GlState::default();
        let mut target = RecordingTarget::default();
        let mut gl = Gl::new(&mut state, &mut target);

        assert!(matches!(gl.vertex2f(0.0, 0.0), Err(DrawError::VertexOutsideBatch)));
        assert!(matches!(gl.end(), Err(DrawError::EndWithoutBegin)));

        gl.begin(Primitive::Triangles).unwrap();
        assert!(matches!(gl.begin(Primitive::Triangles), Err(DrawError::BeginInsideBatch)));
        assert!(matches!(gl.clear(), Err(DrawError::ClearInsideBatch)));
        assert!(matches!(gl.swap_buffers(), Err(DrawError::SwapInsideBatch)));
        gl.end().unwrap();

        assert!(target.clears.is_empty());
        assert_eq!(target.presents, 0);
    }

    #[test]
    fn test_finish_reports_open_batch() {
        let mut state = GlState::default();
        let mut target = RecordingTarget::default();
        let mut gl = Gl::new(&mut state, &mut target);
        gl.clear().unwrap();
        gl.begin(Primitive::Triangles).unwrap();
        for x in [0.0, 1.0, 2.0] {
            gl.vertex2f(x, 0.0).unwrap();
        }
        assert!(matches!(gl.finish(), Err(DrawError::UnterminatedBatch { vertices: 3 })));
        assert!(target.batches.is_empty());
    }

    #[test]
    fn test_finish_after_end_is_ok() {
        let mut state = GlState::default();
        let mut target = RecordingTarget::default();
        let mut gl = Gl::new(&mut state, &mut target);
        gl.begin(Primitive::Triangles).unwrap();
        gl.end().unwrap();
        assert!(gl.finish().is_ok());
    }

    #[test]
    fn test_incomplete_batch_draws_nothing() {
        let mut state = GlState::default();
        let mut target = RecordingTarget::default();
        let mut gl = Gl::new(&mut state, &mut target);
        gl.begin(Primitive::Triangles).unwrap();
        gl.vertex2f(0.0, 0.0).unwrap();
        gl.vertex2f(1.0, 0.0).unwrap();
        gl.end().unwrap();
        assert!(target.batches.is_empty());
    }

    #[test]
    fn test_assemble_triangles_drops_trailing() {
        let verts: Vec<_> = (0..5).map(|i| v(i as f32)).collect();
        assert_eq!(Primitive::Triangles.assemble(&verts).len(), 3);
    }

    #[test]
    fn test_assemble_strip() {
        let verts: Vec<_> = (0..4).map(|i| v(i as f32)).collect();
        let tris = Primitive::TriangleStrip.assemble(&verts);
        let xs: Vec<f32> = tris.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_assemble_fan() {
        let verts: Vec<_> = (0..4).map(|i| v(i as f32)).collect();
        let tris = Primitive::TriangleFan.assemble(&verts);
        let xs: Vec<f32> = tris.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 0.0, 2.0, 3.0]);
        assert!(Primitive::TriangleFan.assemble(&[]).is_empty());
    }
}
