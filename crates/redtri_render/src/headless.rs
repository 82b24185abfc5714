//! Offscreen WGPU render target
//!
//! Renders into a texture instead of a window surface. On `present` the
//! texture is copied into a mappable buffer and read back, so the "front
//! buffer" is a CPU-side image that tests can inspect.

use image::RgbaImage;

use crate::context::{request_device, ContextError, GpuOptions};
use crate::pipeline::{FrameRecorder, TrianglePipeline};
use crate::target::{RenderError, RenderTarget};
use crate::types::ColoredVertex;

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch of the read-back buffer, padded to the copy alignment
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// WGPU device rendering into an offscreen texture
pub struct HeadlessContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
    pipeline: TrianglePipeline,
    frame: FrameRecorder,
    front: RgbaImage,
}

impl HeadlessContext {
    /// Create an offscreen context of `width`×`height` pixels
    pub async fn new(width: u32, height: u32, options: GpuOptions) -> Result<Self, ContextError> {
        if width == 0 || height == 0 {
            return Err(ContextError::InvalidSize { width, height });
        }

        let instance = options.instance();
        let (_adapter, device, queue) = request_device(&instance, None, &options).await?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let readback_size = padded_bytes_per_row(width) as u64 * height as u64;
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: readback_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let pipeline = TrianglePipeline::new(&device, FORMAT);

        Ok(Self {
            device,
            queue,
            texture,
            view,
            readback,
            width,
            height,
            pipeline,
            frame: FrameRecorder::new(),
            front: RgbaImage::new(width, height),
        })
    }

    /// Create an offscreen context, blocking on adapter and device requests
    pub fn new_blocking(
        width: u32,
        height: u32,
        options: GpuOptions,
    ) -> Result<Self, ContextError> {
        pollster::block_on(Self::new(width, height, options))
    }

    /// The last presented frame
    pub fn front(&self) -> &RgbaImage {
        &self.front
    }

    fn read_back(&mut self) -> Result<(), RenderError> {
        let slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|e| RenderError::Other(e.to_string()))?
            .map_err(|e| RenderError::Other(e.to_string()))?;

        {
            let data = slice.get_mapped_range();
            let pitch = padded_bytes_per_row(self.width) as usize;
            let row_len = (self.width * BYTES_PER_PIXEL) as usize;
            let mut pixels = Vec::with_capacity(row_len * self.height as usize);
            for row in data.chunks(pitch).take(self.height as usize) {
                pixels.extend_from_slice(&row[..row_len]);
            }
            self.front = RgbaImage::from_raw(self.width, self.height, pixels)
                .ok_or_else(|| RenderError::Other("read-back size mismatch".to_string()))?;
        }
        self.readback.unmap();
        Ok(())
    }
}

impl RenderTarget for HeadlessContext {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.frame.record_clear(color);
    }

    fn draw_triangles(&mut self, vertices: &[ColoredVertex]) {
        self.frame.record_triangles(vertices);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Offscreen Encoder"),
            });

        self.frame
            .encode(&self.device, &mut encoder, &self.view, &self.pipeline);

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row(self.width)),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        self.read_back()
    }
}
