// ABOUTME: Explicit render context threading GPU binding state through draw code.
// ABOUTME: Validates call order before forwarding to the backend.

use glyph_core::{Color, Mat4, Viewport};

use crate::backend::{BackendError, RenderBackend, Sampling, TextureHandle};
use crate::quad::QuadVertex;
use crate::rasterizer::GlyphBitmap;

/// What is currently bound, as far as draw calls are concerned
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BindingState {
    pub in_frame: bool,
    pub program_active: bool,
    pub texture: Option<TextureHandle>,
    pub vertex_count: u32,
    pub viewport: Option<Viewport>,
    pub mvp: Option<Mat4>,
}

pub struct RenderContext<B: RenderBackend> {
    backend: B,
    bindings: BindingState,
    frames: u64,
    draw_calls: u64,
}

impl<B: RenderBackend> RenderContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            bindings: BindingState::default(),
            frames: 0,
            draw_calls: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn bindings(&self) -> &BindingState {
        &self.bindings
    }

    /// Completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    pub fn create_texture(
        &mut self,
        bitmap: &GlyphBitmap,
        sampling: Sampling,
    ) -> Result<TextureHandle, BackendError> {
        let (width, height) = bitmap.texture_size();
        let texture = self.backend.create_texture(bitmap, sampling)?;
        tracing::debug!(
            "Created texture {} ({}x{}, {:?})",
            texture.id(),
            width,
            height,
            sampling.filter
        );
        Ok(texture)
    }

    pub fn release_texture(&mut self, texture: TextureHandle) -> bool {
        if self.bindings.texture == Some(texture) {
            self.bindings.texture = None;
        }
        self.backend.release_texture(texture)
    }

    pub fn begin_frame(&mut self, viewport: Viewport) -> Result<(), BackendError> {
        if self.bindings.in_frame {
            return Err(BackendError::FrameInProgress);
        }
        self.backend.begin_frame(viewport)?;
        self.bindings.in_frame = true;
        self.bindings.viewport = Some(viewport);
        Ok(())
    }

    pub fn clear(&mut self, color: Color) -> Result<(), BackendError> {
        self.require_frame()?;
        self.backend.clear(color);
        Ok(())
    }

    pub fn use_program(&mut self) {
        self.backend.use_program();
        self.bindings.program_active = true;
    }

    pub fn set_mvp(&mut self, mvp: &Mat4) -> Result<(), BackendError> {
        if !self.bindings.program_active {
            return Err(BackendError::NoProgram);
        }
        self.backend.set_mvp(mvp);
        self.bindings.mvp = Some(*mvp);
        Ok(())
    }

    pub fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<(), BackendError> {
        if unit != 0 {
            return Err(BackendError::UnsupportedTextureUnit(unit));
        }
        self.backend.bind_texture(unit, texture)?;
        self.bindings.texture = Some(texture);
        Ok(())
    }

    pub fn upload_vertices(&mut self, vertices: &[QuadVertex]) -> Result<(), BackendError> {
        self.backend.upload_vertices(vertices)?;
        self.bindings.vertex_count = vertices.len() as u32;
        Ok(())
    }

    pub fn draw_triangles(&mut self, vertex_count: u32) -> Result<(), BackendError> {
        self.require_frame()?;
        if !self.bindings.program_active {
            return Err(BackendError::NoProgram);
        }
        if self.bindings.texture.is_none() {
            return Err(BackendError::NoTexture);
        }
        if vertex_count > self.bindings.vertex_count {
            return Err(BackendError::VertexUnderflow {
                requested: vertex_count,
                uploaded: self.bindings.vertex_count,
            });
        }
        self.backend.draw_triangles(vertex_count)?;
        self.draw_calls += 1;
        Ok(())
    }

    /// Present the frame. Binding state survives into the next frame.
    pub fn end_frame(&mut self) -> Result<(), BackendError> {
        self.require_frame()?;
        // The frame is over even if presenting fails
        self.bindings.in_frame = false;
        self.backend.end_frame()?;
        self.frames += 1;
        Ok(())
    }

    /// Drop a frame that failed midway so the next one can start cleanly.
    pub fn abandon_frame(&mut self) {
        if self.bindings.in_frame {
            self.bindings.in_frame = false;
            if let Err(e) = self.backend.end_frame() {
                tracing::warn!("Failed to close abandoned frame: {}", e);
            }
        }
    }

    fn require_frame(&self) -> Result<(), BackendError> {
        if self.bindings.in_frame {
            Ok(())
        } else {
            Err(BackendError::NoFrame)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordedCall, RecordingBackend};
    use crate::rasterizer::GlyphMetrics;

    fn texture(ctx: &mut RenderContext<RecordingBackend>) -> TextureHandle {
        let bitmap = GlyphBitmap {
            metrics: GlyphMetrics {
                pixel_width: 2,
                pixel_height: 2,
                ..Default::default()
            },
            pixels: vec![0, 255, 255, 0],
        };
        ctx.create_texture(&bitmap, Sampling::default()).unwrap()
    }

    #[test]
    fn test_draw_requires_frame() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        assert!(matches!(ctx.draw_triangles(6), Err(BackendError::NoFrame)));
        assert!(matches!(ctx.clear(Color::BACKGROUND), Err(BackendError::NoFrame)));
        assert!(matches!(ctx.end_frame(), Err(BackendError::NoFrame)));
    }

    #[test]
    fn test_draw_requires_program_and_texture() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let tex = texture(&mut ctx);
        ctx.begin_frame(Viewport::new(10, 10)).unwrap();

        assert!(matches!(ctx.draw_triangles(6), Err(BackendError::NoProgram)));
        ctx.use_program();
        assert!(matches!(ctx.draw_triangles(6), Err(BackendError::NoTexture)));
        ctx.bind_texture(0, tex).unwrap();
        assert!(matches!(
            ctx.draw_triangles(6),
            Err(BackendError::VertexUnderflow { requested: 6, uploaded: 0 })
        ));
        ctx.upload_vertices(&[QuadVertex::new(0.0, 0.0, 0.0, 0.0); 6])
            .unwrap();
        ctx.draw_triangles(6).unwrap();
        ctx.end_frame().unwrap();

        assert_eq!(ctx.frames(), 1);
        assert_eq!(ctx.draw_calls(), 1);
    }

    #[test]
    fn test_set_mvp_requires_program() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        assert!(matches!(
            ctx.set_mvp(&Mat4::IDENTITY),
            Err(BackendError::NoProgram)
        ));
        ctx.use_program();
        ctx.set_mvp(&Mat4::IDENTITY).unwrap();
        assert_eq!(ctx.bindings().mvp, Some(Mat4::IDENTITY));
    }

    #[test]
    fn test_only_unit_zero() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let tex = texture(&mut ctx);
        assert!(matches!(
            ctx.bind_texture(1, tex),
            Err(BackendError::UnsupportedTextureUnit(1))
        ));
    }

    #[test]
    fn test_nested_frame_rejected() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        ctx.begin_frame(Viewport::new(4, 4)).unwrap();
        assert!(matches!(
            ctx.begin_frame(Viewport::new(4, 4)),
            Err(BackendError::FrameInProgress)
        ));
        ctx.abandon_frame();
        ctx.begin_frame(Viewport::new(4, 4)).unwrap();
    }

    #[test]
    fn test_release_unbinds() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let tex = texture(&mut ctx);
        ctx.bind_texture(0, tex).unwrap();
        assert_eq!(ctx.bindings().texture, Some(tex));

        assert!(ctx.release_texture(tex));
        assert_eq!(ctx.bindings().texture, None);
        assert!(!ctx.release_texture(tex));
        assert!(ctx
            .backend()
            .calls()
            .contains(&RecordedCall::ReleaseTexture(tex)));
    }

    #[test]
    fn test_bind_unknown_texture_fails() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let tex = texture(&mut ctx);
        ctx.release_texture(tex);
        assert!(matches!(
            ctx.bind_texture(0, tex),
            Err(BackendError::UnknownTexture(_))
        ));
        assert_eq!(ctx.bindings().texture, None);
    }
}
