//! Window-backed WGPU render context
//!
//! Owns the surface, device and queue for one window. Frames are recorded
//! through the [`RenderTarget`] impl and submitted on `present`.

use std::sync::Arc;

use winit::window::Window;

use crate::pipeline::{FrameRecorder, TrianglePipeline};
use crate::target::{RenderError, RenderTarget};
use crate::types::ColoredVertex;

/// Adapter and instance selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuOptions {
    pub power_preference: wgpu::PowerPreference,
    /// Present with vertical sync
    pub vsync: bool,
    /// Enable backend validation layers
    pub validation: bool,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            vsync: true,
            validation: false,
        }
    }
}

impl GpuOptions {
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    pub(crate) fn instance(&self) -> wgpu::Instance {
        let flags = if self.validation {
            wgpu::InstanceFlags::debugging()
        } else {
            wgpu::InstanceFlags::default()
        };
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            flags,
            ..Default::default()
        })
    }
}

/// Render context creation errors
#[derive(Debug)]
pub enum ContextError {
    /// The window could not back a surface
    SurfaceCreation(String),
    /// No adapter matched the request
    NoAdapter,
    /// The adapter refused to open a device
    DeviceRequest(String),
    /// The surface reports no usable format
    UnsupportedSurface,
    /// Offscreen targets need non-zero dimensions
    InvalidSize { width: u32, height: u32 },
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::SurfaceCreation(msg) => write!(f, "Surface creation failed: {}", msg),
            ContextError::NoAdapter => write!(f, "No compatible graphics adapter found"),
            ContextError::DeviceRequest(msg) => write!(f, "Device request failed: {}", msg),
            ContextError::UnsupportedSurface => write!(f, "Surface has no supported format"),
            ContextError::InvalidSize { width, height } => {
                write!(f, "Invalid render target size {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for ContextError {}

/// Request an adapter and open a device on it
pub(crate) async fn request_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
    options: &GpuOptions,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), ContextError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: options.power_preference,
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(ContextError::NoAdapter)?;

    let info = adapter.get_info();
    log::info!("Using adapter: {} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Render Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        )
        .await
        .map_err(|e| ContextError::DeviceRequest(e.to_string()))?;

    Ok((adapter, device, queue))
}

/// WGPU device, queue, and surface bound to a window
pub struct RenderContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pipeline: TrianglePipeline,
    frame: FrameRecorder,
}

impl RenderContext {
    /// Create a render context for `window`
    pub async fn new(window: Arc<Window>, options: GpuOptions) -> Result<Self, ContextError> {
        let size = window.inner_size();
        let instance = options.instance();

        let surface = instance
            .create_surface(window)
            .map_err(|e| ContextError::SurfaceCreation(e.to_string()))?;

        let (adapter, device, queue) = request_device(&instance, Some(&surface), &options).await?;

        let caps = surface.get_capabilities(&adapter);
        // Prefer an sRGB format so float colors land unchanged on screen
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(ContextError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: options.present_mode(),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Configured surface {}x{} as {:?}, {:?}",
            config.width,
            config.height,
            format,
            config.present_mode
        );

        let pipeline = TrianglePipeline::new(&device, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline,
            frame: FrameRecorder::new(),
        })
    }

    /// Handle window resize; the viewport follows the new size
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapply the current configuration after the surface was lost or outdated
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }
}

impl RenderTarget for RenderContext {
    fn size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.frame.record_clear(color);
    }

    fn draw_triangles(&mut self, vertices: &[ColoredVertex]) {
        self.frame.record_triangles(vertices);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                self.frame.reset();
                return Err(e.into());
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.frame
            .encode(&self.device, &mut encoder, &view, &self.pipeline);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
