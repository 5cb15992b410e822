// ABOUTME: Per-frame drawing of the glyph quad.
// ABOUTME: Aspect-corrected orthographic MVP, clear, and a single 6-vertex draw.

use glyph_core::{Color, Mat4, Viewport};

use crate::backend::{BackendError, RenderBackend};
use crate::context::RenderContext;
use crate::quad::Quad;
use crate::rasterizer::Glyph;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl RenderError {
    /// The surface needs reconfiguring before the next frame
    pub fn is_surface_lost(&self) -> bool {
        matches!(
            self,
            Self::Backend(BackendError::Surface(
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated
            ))
        )
    }
}

pub struct FrameRenderer {
    quad: Quad,
    scale: f32,
    glyph_size: (u32, u32),
    clear_color: Color,
    model_offset: [f32; 3],
}

impl FrameRenderer {
    pub fn new(glyph: &Glyph, scale: f32) -> Self {
        Self {
            quad: Quad::for_glyph(glyph, scale),
            scale,
            glyph_size: (glyph.pixel_width, glyph.pixel_height),
            clear_color: Color::BACKGROUND,
            model_offset: [0.0, 0.0, 0.0],
        }
    }

    pub fn quad(&self) -> &Quad {
        &self.quad
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        if scale != self.scale {
            self.scale = scale;
            self.quad = Quad::centered(self.glyph_size.0, self.glyph_size.1, scale);
        }
    }

    /// projection * model for the given viewport
    pub fn mvp(&self, viewport: Viewport) -> Mat4 {
        let projection = Mat4::ortho_default(viewport.aspect_ratio());
        let model = Mat4::IDENTITY.translate(self.model_offset);
        projection * model
    }

    /// Draw one frame. Every step runs unconditionally; nothing is cached
    /// between frames except the quad, and GPU state is left as bound.
    pub fn render<B: RenderBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        glyph: &Glyph,
        viewport: Viewport,
    ) -> Result<(), RenderError> {
        if (glyph.pixel_width, glyph.pixel_height) != self.glyph_size {
            self.glyph_size = (glyph.pixel_width, glyph.pixel_height);
            self.quad = Quad::for_glyph(glyph, self.scale);
        }

        ctx.begin_frame(viewport)?;
        if let Err(e) = self.draw(ctx, glyph, viewport) {
            ctx.abandon_frame();
            return Err(e.into());
        }
        ctx.end_frame()?;
        Ok(())
    }

    fn draw<B: RenderBackend>(
        &self,
        ctx: &mut RenderContext<B>,
        glyph: &Glyph,
        viewport: Viewport,
    ) -> Result<(), BackendError> {
        let mvp = self.mvp(viewport);

        ctx.clear(self.clear_color)?;
        ctx.use_program();
        ctx.set_mvp(&mvp)?;
        ctx.bind_texture(0, glyph.texture)?;
        ctx.upload_vertices(self.quad.vertices())?;
        ctx.draw_triangles(Quad::VERTEX_COUNT)
    }
}
