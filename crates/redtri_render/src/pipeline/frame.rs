//! Per-frame command recording
//!
//! Immediate-mode calls arrive one at a time, but a GPU frame is encoded in one
//! go once the frame texture is available. `FrameRecorder` buffers the clears
//! and triangle batches of the current frame and replays them as render passes.
//! A clear becomes the load op of the pass that follows it. Batches between
//! two clears share one pass.

use std::ops::Range;

use wgpu::util::DeviceExt;

use super::TrianglePipeline;
use crate::types::ColoredVertex;

/// A recorded frame command
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOp {
    Clear([f32; 4]),
    /// Vertex range into the recorder's vertex list
    Draw(Range<u32>),
}

/// One render pass worth of work
#[derive(Debug, PartialEq)]
pub(crate) struct PassPlan {
    pub clear: Option<[f32; 4]>,
    pub draws: Vec<Range<u32>>,
}

/// Buffered commands for the frame being drawn
#[derive(Debug, Default)]
pub struct FrameRecorder {
    ops: Vec<FrameOp>,
    vertices: Vec<ColoredVertex>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_clear(&mut self, color: [f32; 4]) {
        self.ops.push(FrameOp::Clear(color));
    }

    pub fn record_triangles(&mut self, vertices: &[ColoredVertex]) {
        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.ops.push(FrameOp::Draw(start..self.vertices.len() as u32));
    }

    /// Drop everything recorded so far
    pub fn reset(&mut self) {
        self.ops.clear();
        self.vertices.clear();
    }

    /// Group the recorded ops into render passes
    pub(crate) fn plan(&self) -> Vec<PassPlan> {
        let mut passes = Vec::new();
        let mut current = PassPlan {
            clear: None,
            draws: Vec::new(),
        };

        for op in &self.ops {
            match op {
                FrameOp::Clear(color) => {
                    if !current.draws.is_empty() {
                        passes.push(std::mem::replace(
                            &mut current,
                            PassPlan {
                                clear: None,
                                draws: Vec::new(),
                            },
                        ));
                    }
                    // A later clear overrides an earlier one with nothing drawn between
                    current.clear = Some(*color);
                }
                FrameOp::Draw(range) => current.draws.push(range.clone()),
            }
        }

        if current.clear.is_some() || !current.draws.is_empty() {
            passes.push(current);
        }
        passes
    }

    /// Encode the recorded frame into `view` and reset the recorder
    pub fn encode(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        pipeline: &TrianglePipeline,
    ) {
        let passes = self.plan();
        let vertex_buffer = (!self.vertices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Immediate Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        for pass in &passes {
            let load = match pass.clear {
                Some(c) => wgpu::LoadOp::Clear(wgpu::Color {
                    r: c[0] as f64,
                    g: c[1] as f64,
                    b: c[2] as f64,
                    a: c[3] as f64,
                }),
                None => wgpu::LoadOp::Load,
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Immediate Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(buffer) = &vertex_buffer {
                pipeline.draw(&mut render_pass, buffer, &pass.draws);
            }
        }

        log::debug!(
            "Encoded {} passes, {} vertices",
            passes.len(),
            self.vertices.len()
        );
        self.reset();
    }
}
