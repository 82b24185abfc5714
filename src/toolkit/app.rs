//! Event loop handler
//!
//! Creates the window and its render context on resume and dispatches
//! redraws to the display callback. Closing the window ends the loop.

use std::sync::Arc;

use redtri_render::{DrawError, GpuOptions, RenderContext, RenderError};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow},
    window::{Window, WindowId},
};

use super::{ToolkitError, ToolkitState, WindowSpec};

/// Live window and the context bound to it
struct WindowContext {
    window: Arc<Window>,
    render_context: RenderContext,
    /// False while the window has a zero-sized client area (minimized)
    drawable: bool,
}

/// A zero-sized surface cannot be configured or drawn to
fn is_drawable(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

/// What the loop does after a redraw
#[derive(Debug)]
pub(super) enum FrameOutcome {
    Presented,
    /// Surface lost or outdated; reconfigure and draw again
    Reconfigure,
    /// Stop the loop with this error
    Fatal(ToolkitError),
    /// The frame was dropped; the loop carries on
    Skipped(DrawError),
}

pub(super) fn frame_outcome(result: Result<(), DrawError>) -> FrameOutcome {
    match result {
        Ok(()) => FrameOutcome::Presented,
        Err(DrawError::Present(RenderError::SurfaceLost | RenderError::SurfaceOutdated)) => {
            FrameOutcome::Reconfigure
        }
        Err(DrawError::Present(RenderError::OutOfMemory)) => {
            FrameOutcome::Fatal(ToolkitError::Render(RenderError::OutOfMemory))
        }
        Err(e) => FrameOutcome::Skipped(e),
    }
}

pub(super) struct ToolkitApp {
    state: ToolkitState,
    gpu: GpuOptions,
    current: Option<WindowContext>,
    fatal: Option<ToolkitError>,
}

impl ToolkitApp {
    pub(super) fn new(state: ToolkitState, mut gpu: GpuOptions) -> Self {
        gpu.validation |= state.options().gl_debug;
        Self {
            state,
            gpu,
            current: None,
            fatal: None,
        }
    }

    pub(super) fn into_fatal_error(self) -> Option<ToolkitError> {
        self.fatal
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ToolkitError) {
        log::error!("{}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn create_window(
        event_loop: &ActiveEventLoop,
        spec: &WindowSpec,
        gpu: GpuOptions,
    ) -> Result<WindowContext, ToolkitError> {
        let mut attrs = Window::default_attributes()
            .with_title(&spec.title)
            .with_inner_size(PhysicalSize::new(spec.width, spec.height));

        if let Some((x, y)) = spec.position {
            attrs = attrs.with_position(PhysicalPosition::new(x, y));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| ToolkitError::WindowCreation(e.to_string()))?,
        );

        if spec.iconic {
            window.set_minimized(true);
        }
        if !spec.display_mode.is_double_buffered() {
            log::warn!("Single buffering requested; window surfaces always present a back buffer");
        }

        let render_context = pollster::block_on(RenderContext::new(window.clone(), gpu))?;
        log::info!(
            "Created window \"{}\" ({}x{})",
            spec.title,
            render_context.size.width,
            render_context.size.height
        );

        let drawable = is_drawable(render_context.size);
        Ok(WindowContext {
            window,
            render_context,
            drawable,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if !current.drawable {
            return;
        }

        match frame_outcome(self.state.redisplay(&mut current.render_context)) {
            FrameOutcome::Presented => {}
            FrameOutcome::Reconfigure => {
                current.render_context.reconfigure();
                current.window.request_redraw();
            }
            FrameOutcome::Fatal(err) => self.fail(event_loop, err),
            FrameOutcome::Skipped(e) => log::warn!("Display callback failed: {}", e),
        }
    }
}

impl ApplicationHandler for ToolkitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.current.is_some() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Wait);

        let Some(spec) = self.state.window().cloned() else {
            self.fail(event_loop, ToolkitError::NoWindow);
            return;
        };

        match Self::create_window(event_loop, &spec, self.gpu) {
            Ok(current) => {
                current.window.request_redraw();
                self.current = Some(current);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(current) = &mut self.current {
                    current.drawable = is_drawable(physical_size);
                    if current.drawable {
                        current.render_context.resize(physical_size);
                        current.window.request_redraw();
                    } else {
                        log::debug!("Window minimized; redraws paused");
                    }
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_window_is_not_drawable() {
        assert!(is_drawable(PhysicalSize::new(400, 400)));
        assert!(!is_drawable(PhysicalSize::new(0, 0)));
        assert!(!is_drawable(PhysicalSize::new(400, 0)));
        assert!(!is_drawable(PhysicalSize::new(0, 400)));
    }

    #[test]
    fn test_surface_loss_reconfigures() {
        for err in [RenderError::SurfaceLost, RenderError::SurfaceOutdated] {
            assert!(matches!(
                frame_outcome(Err(DrawError::Present(err))),
                FrameOutcome::Reconfigure
            ));
        }
    }

    #[test]
    fn test_out_of_memory_is_fatal() {
        let outcome = frame_outcome(Err(DrawError::Present(RenderError::OutOfMemory)));
        assert!(matches!(
            outcome,
            FrameOutcome::Fatal(ToolkitError::Render(RenderError::OutOfMemory))
        ));
    }

    #[test]
    fn test_other_errors_skip_the_frame() {
        assert!(matches!(frame_outcome(Ok(())), FrameOutcome::Presented));
        assert!(matches!(
            frame_outcome(Err(DrawError::Present(RenderError::Timeout))),
            FrameOutcome::Skipped(DrawError::Present(RenderError::Timeout))
        ));
        assert!(matches!(
            frame_outcome(Err(DrawError::UnterminatedBatch { vertices: 3 })),
            FrameOutcome::Skipped(DrawError::UnterminatedBatch { vertices: 3 })
        ));
    }
}
