// ABOUTME: The GPU seam: a small GL-flavoured command trait plus shared handle types.
// ABOUTME: Implemented by the wgpu backend and by the call-recording test backend.

use std::num::NonZeroU32;

use glyph_core::{Color, Mat4, TextureFilter, Viewport};

use crate::quad::QuadVertex;
use crate::rasterizer::GlyphBitmap;

/// Opaque, always-valid texture id. Zero is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(NonZeroU32);

impl TextureHandle {
    pub fn new(id: NonZeroU32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0.get()
    }
}

/// Hands out texture handles starting at 1.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: Option<NonZeroU32>,
}

impl HandleAllocator {
    pub fn next(&mut self) -> TextureHandle {
        let id = self.next.unwrap_or(NonZeroU32::MIN);
        self.next = id.checked_add(1);
        TextureHandle(id)
    }
}

/// How the glyph texture is sampled. Coordinates always wrap (repeat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sampling {
    pub filter: TextureFilter,
}

impl From<TextureFilter> for Sampling {
    fn from(filter: TextureFilter) -> Self {
        Self { filter }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Unknown texture handle {}", .0.id())]
    UnknownTexture(TextureHandle),

    #[error("Texture unit {0} is not available")]
    UnsupportedTextureUnit(u32),

    #[error("Vertex upload of {count} vertices exceeds capacity {capacity}")]
    VertexOverflow { count: usize, capacity: usize },

    #[error("Draw of {requested} vertices but only {uploaded} uploaded")]
    VertexUnderflow { requested: u32, uploaded: u32 },

    #[error("Texture upload rejected: {0}")]
    Upload(String),

    #[error("No frame in progress")]
    NoFrame,

    #[error("Frame already in progress")]
    FrameInProgress,

    #[error("Draw issued without an active program")]
    NoProgram,

    #[error("Draw issued without a bound texture")]
    NoTexture,
}

/// GPU commands needed to show one textured glyph.
///
/// Calls mirror the order a GL program issues them in. Binding state
/// validation lives in [`crate::RenderContext`]; implementations may assume
/// a well-formed call sequence but must still fail instead of panicking.
pub trait RenderBackend {
    /// Upload a single-channel bitmap, rows tightly packed.
    fn create_texture(
        &mut self,
        bitmap: &GlyphBitmap,
        sampling: Sampling,
    ) -> Result<TextureHandle, BackendError>;

    /// Returns false if the handle was unknown.
    fn release_texture(&mut self, texture: TextureHandle) -> bool;

    fn begin_frame(&mut self, viewport: Viewport) -> Result<(), BackendError>;

    fn clear(&mut self, color: Color);

    fn use_program(&mut self);

    fn set_mvp(&mut self, mvp: &Mat4);

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<(), BackendError>;

    fn upload_vertices(&mut self, vertices: &[QuadVertex]) -> Result<(), BackendError>;

    /// Triangle-list draw of the first `vertex_count` uploaded vertices.
    fn draw_triangles(&mut self, vertex_count: u32) -> Result<(), BackendError>;

    fn end_frame(&mut self) -> Result<(), BackendError>;
}
