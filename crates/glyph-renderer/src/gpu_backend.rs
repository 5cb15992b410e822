// ABOUTME: RenderBackend on top of wgpu and a winit window surface.
// ABOUTME: Maps GL-style bind/draw calls onto render passes, one per draw.

use std::collections::HashMap;
use std::sync::Arc;

use glyph_core::{Color, Mat4, Viewport};
use winit::window::Window;

use crate::backend::{BackendError, HandleAllocator, RenderBackend, Sampling, TextureHandle};
use crate::glyph_pipeline::{GlyphPipeline, GlyphTexture};
use crate::gpu::{GpuError, GpuState};
use crate::quad::QuadVertex;
use crate::rasterizer::GlyphBitmap;

struct Frame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    cleared: bool,
}

pub struct WgpuBackend {
    gpu: GpuState,
    pipeline: GlyphPipeline,
    textures: HashMap<TextureHandle, GlyphTexture>,
    handles: HandleAllocator,
    frame: Option<Frame>,
    clear_color: wgpu::Color,
    bound: Option<TextureHandle>,
    vertex_count: u32,
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let gpu = GpuState::new(window).await?;
        let pipeline = GlyphPipeline::new(&gpu.device, gpu.config.format).await?;

        tracing::info!(
            "GPU backend ready: {:?} surface at {}x{}",
            gpu.config.format,
            gpu.config.width,
            gpu.config.height
        );

        Ok(Self {
            gpu,
            pipeline,
            textures: HashMap::new(),
            handles: HandleAllocator::default(),
            frame: None,
            clear_color: wgpu::Color::BLACK,
            bound: None,
            vertex_count: 0,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    /// Reconfigure after `SurfaceError::Lost` or `Outdated`
    pub fn reconfigure(&mut self) {
        self.gpu.reconfigure();
    }

    fn encode_pass(&mut self, vertex_count: u32) -> Result<(), BackendError> {
        let frame = self.frame.as_mut().ok_or(BackendError::NoFrame)?;
        let texture = match self.bound {
            Some(handle) if vertex_count > 0 => Some(
                self.textures
                    .get(&handle)
                    .ok_or(BackendError::UnknownTexture(handle))?,
            ),
            Some(_) => None,
            None if vertex_count > 0 => return Err(BackendError::NoTexture),
            None => None,
        };

        let load = if frame.cleared {
            wgpu::LoadOp::Load
        } else {
            wgpu::LoadOp::Clear(self.clear_color)
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Glyph Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Glyph Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
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

            let (width, height) = (self.gpu.config.width, self.gpu.config.height);
            render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);

            if let Some(texture) = texture {
                self.pipeline.draw(&mut render_pass, texture, vertex_count);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.cleared = true;
        Ok(())
    }
}

impl RenderBackend for WgpuBackend {
    fn create_texture(
        &mut self,
        bitmap: &GlyphBitmap,
        sampling: Sampling,
    ) -> Result<TextureHandle, BackendError> {
        let texture =
            self.pipeline
                .create_texture(&self.gpu.device, &self.gpu.queue, bitmap, sampling)?;
        let handle = self.handles.next();
        self.textures.insert(handle, texture);
        Ok(handle)
    }

    fn release_texture(&mut self, texture: TextureHandle) -> bool {
        if self.bound == Some(texture) {
            self.bound = None;
        }
        self.textures.remove(&texture).is_some()
    }

    fn begin_frame(&mut self, viewport: Viewport) -> Result<(), BackendError> {
        if (viewport.width, viewport.height) != self.gpu.size {
            // Ignores empty sizes; the surface keeps its last valid size
            self.gpu.resize(viewport.width, viewport.height);
        }

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.frame = Some(Frame {
            output,
            view,
            cleared: false,
        });
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64,
        };
        if let Some(frame) = self.frame.as_mut() {
            frame.cleared = false;
        }
    }

    fn use_program(&mut self) {
        // A single pipeline; it is set on every pass
    }

    fn set_mvp(&mut self, mvp: &Mat4) {
        self.pipeline.write_mvp(&self.gpu.queue, mvp);
    }

    fn bind_texture(&mut self, _unit: u32, texture: TextureHandle) -> Result<(), BackendError> {
        if !self.textures.contains_key(&texture) {
            return Err(BackendError::UnknownTexture(texture));
        }
        self.bound = Some(texture);
        Ok(())
    }

    fn upload_vertices(&mut self, vertices: &[QuadVertex]) -> Result<(), BackendError> {
        self.pipeline.write_vertices(&self.gpu.queue, vertices)?;
        self.vertex_count = vertices.len() as u32;
        Ok(())
    }

    fn draw_triangles(&mut self, vertex_count: u32) -> Result<(), BackendError> {
        if vertex_count > self.vertex_count {
            return Err(BackendError::VertexUnderflow {
                requested: vertex_count,
                uploaded: self.vertex_count,
            });
        }
        self.encode_pass(vertex_count)
    }

    fn end_frame(&mut self) -> Result<(), BackendError> {
        let needs_clear = match &self.frame {
            Some(frame) => !frame.cleared,
            None => return Err(BackendError::NoFrame),
        };
        if needs_clear {
            self.encode_pass(0)?;
        }
        if let Some(frame) = self.frame.take() {
            frame.output.present();
        }
        Ok(())
    }
}
