// ABOUTME: Glyph rasterization and textured quad rendering.
// ABOUTME: fontdue bitmaps go to wgpu textures; drawing runs through a RenderContext.

pub mod backend;
pub mod context;
pub mod font;
pub mod frame;
mod glyph_pipeline;
mod gpu;
pub mod gpu_backend;
pub mod quad;
pub mod rasterizer;
pub mod recording;

pub use backend::{BackendError, RenderBackend, Sampling, TextureHandle};
pub use context::{BindingState, RenderContext};
pub use frame::{FrameRenderer, RenderError};
pub use gpu::GpuError;
pub use gpu_backend::WgpuBackend;
pub use quad::{Quad, QuadVertex};
pub use rasterizer::{Glyph, GlyphBitmap, GlyphMetrics, GlyphRasterizer, RasterizationError};
pub use recording::{RecordedCall, RecordingBackend};
