//! GPU pipeline components
//!
//! `TrianglePipeline` draws colored 2D triangles, and `FrameRecorder`
//! turns one frame's immediate-mode commands into render passes.

pub mod frame;
pub mod triangle_pipeline;

pub use frame::{FrameOp, FrameRecorder};
pub use triangle_pipeline::TrianglePipeline;
