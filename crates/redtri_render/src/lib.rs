//! Immediate-mode triangle rendering
//!
//! This crate provides a fixed-function style drawing layer (`begin`/`vertex`/`end`)
//! on top of interchangeable render targets.
//!
//! ## Key Components
//!
//! - [`immediate::Gl`] - Immediate-mode command layer bound to one target per frame
//! - [`target::RenderTarget`] - Sink for clears, triangle batches and presents
//! - [`software::Framebuffer`] - Double-buffered CPU rasterizer, used headless
//! - [`context::RenderContext`] - WGPU device, queue, and window surface management
//! - [`headless::HeadlessContext`] - Offscreen WGPU texture with read-back

pub mod context;
pub mod headless;
pub mod immediate;
pub mod pipeline;
pub mod software;
pub mod target;
pub mod types;

pub use context::{ContextError, GpuOptions, RenderContext};
pub use headless::HeadlessContext;
pub use immediate::{DrawError, Gl, GlState, Primitive};
pub use software::{Buffering, FrameStats, Framebuffer};
pub use target::{RenderError, RenderTarget};
pub use types::ColoredVertex;
