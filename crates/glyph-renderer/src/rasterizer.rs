// ABOUTME: Rasterizes one character into a single-channel GPU texture.
// ABOUTME: Returns the texture handle with the glyph's bearing and advance metrics.

use std::path::{Path, PathBuf};

use crate::backend::{BackendError, RenderBackend, Sampling, TextureHandle};
use crate::context::RenderContext;
use crate::font::FontEngine;

#[derive(Debug, thiserror::Error)]
pub enum RasterizationError {
    #[error("Failed to initialize font engine at {0}px")]
    EngineInit(u32),

    #[error("Failed to load font {}: {source}", .path.display())]
    FaceLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse font {}: {reason}", .path.display())]
    FaceParse { path: PathBuf, reason: String },

    #[error("Failed to load glyph {character:?}: {reason}")]
    GlyphLoad { character: char, reason: String },

    #[error("Failed to upload glyph texture: {0}")]
    Upload(#[from] BackendError),
}

impl RasterizationError {
    /// The font file could not be read or parsed
    pub fn is_face_load(&self) -> bool {
        matches!(self, Self::FaceLoad { .. } | Self::FaceParse { .. })
    }
}

/// Size and placement of a rasterized glyph, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Pen origin to the bitmap's left edge
    pub bearing_left: i32,
    /// Baseline to the bitmap's top row, positive upward
    pub bearing_top: i32,
    /// Horizontal advance in 1/64 pixel units
    pub advance_units: u32,
}

/// Coverage bitmap, one byte per pixel, top row first, no row padding.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub metrics: GlyphMetrics,
    pub pixels: Vec<u8>,
}

impl GlyphBitmap {
    /// Dimensions of the texture that holds this bitmap.
    ///
    /// Whitespace glyphs have no pixels; they get a 1x1 transparent texture so
    /// the handle stays usable.
    pub fn texture_size(&self) -> (u32, u32) {
        if self.is_empty() {
            (1, 1)
        } else {
            (self.metrics.pixel_width, self.metrics.pixel_height)
        }
    }

    /// Pixel data matching [`Self::texture_size`]
    pub fn texture_data(&self) -> &[u8] {
        if self.is_empty() {
            &[0]
        } else {
            &self.pixels
        }
    }

    /// Rows are tightly packed: one byte per pixel, no alignment padding
    pub fn bytes_per_row(&self) -> u32 {
        self.texture_size().0
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.pixel_width == 0 || self.metrics.pixel_height == 0
    }
}

/// A character resident on the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub texture: TextureHandle,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub bearing_left: i32,
    pub bearing_top: i32,
    pub advance_units: u32,
}

impl Glyph {
    pub fn metrics(&self) -> GlyphMetrics {
        GlyphMetrics {
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
            bearing_left: self.bearing_left,
            bearing_top: self.bearing_top,
            advance_units: self.advance_units,
        }
    }

    pub fn advance_pixels(&self) -> f32 {
        self.advance_units as f32 / 64.0
    }
}

pub struct GlyphRasterizer {
    sampling: Sampling,
}

impl GlyphRasterizer {
    pub fn new(sampling: Sampling) -> Self {
        Self { sampling }
    }

    /// Rasterize on the CPU only. Engine and face are released before returning.
    pub fn rasterize_bitmap(
        character: char,
        font_path: &Path,
        pixel_size: u32,
    ) -> Result<GlyphBitmap, RasterizationError> {
        let engine = FontEngine::init(pixel_size)?;
        let face = engine.load_face(font_path)?;
        face.render(character)
    }

    /// Rasterize `character` and upload it as a texture.
    pub fn rasterize<B: RenderBackend>(
        &self,
        ctx: &mut RenderContext<B>,
        character: char,
        font_path: &Path,
        pixel_size: u32,
    ) -> Result<Glyph, RasterizationError> {
        let engine = FontEngine::init(pixel_size)?;
        let face = engine.load_face(font_path)?;
        let bitmap = face.render(character)?;
        let glyph = self.upload(ctx, &bitmap)?;

        tracing::info!(
            "Rasterized {:?} from {} at {}px: {}x{} bearing ({}, {}) advance {}",
            character,
            face.path().display(),
            engine.pixel_size(),
            glyph.pixel_width,
            glyph.pixel_height,
            glyph.bearing_left,
            glyph.bearing_top,
            glyph.advance_units
        );

        Ok(glyph)
    }

    /// Upload an already rasterized bitmap
    pub fn upload<B: RenderBackend>(
        &self,
        ctx: &mut RenderContext<B>,
        bitmap: &GlyphBitmap,
    ) -> Result<Glyph, RasterizationError> {
        let texture = ctx.create_texture(bitmap, self.sampling)?;
        let m = bitmap.metrics;

        Ok(Glyph {
            texture,
            pixel_width: m.pixel_width,
            pixel_height: m.pixel_height,
            bearing_left: m.bearing_left,
            bearing_top: m.bearing_top,
            advance_units: m.advance_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::test_font_path;
    use crate::recording::{RecordedCall, RecordingBackend};
    use glyph_core::TextureFilter;

    fn bitmap(width: u32, height: u32) -> GlyphBitmap {
        GlyphBitmap {
            metrics: GlyphMetrics {
                pixel_width: width,
                pixel_height: height,
                bearing_left: 1,
                bearing_top: height as i32,
                advance_units: 640,
            },
            pixels: (0..width * height).map(|i| (i % 256) as u8).collect(),
        }
    }

    #[test]
    fn test_upload_copies_metrics() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let rasterizer = GlyphRasterizer::new(Sampling::default());

        let glyph = rasterizer.upload(&mut ctx, &bitmap(3, 5)).unwrap();
        assert_eq!(glyph.metrics(), bitmap(3, 5).metrics);
        assert_eq!(glyph.advance_pixels(), 10.0);
        assert!(glyph.texture.id() > 0);
    }

    #[test]
    fn test_upload_is_single_channel_and_unpadded() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let rasterizer = GlyphRasterizer::new(Sampling::from(TextureFilter::Nearest));

        // 3 bytes per row would be padded to 4 under a 4-byte alignment rule
        let glyph = rasterizer.upload(&mut ctx, &bitmap(3, 5)).unwrap();

        let texture = ctx.backend().texture(glyph.texture).unwrap();
        assert_eq!((texture.width, texture.height), (3, 5));
        assert_eq!(texture.bytes_per_row, 3);
        assert_eq!(texture.pixels, bitmap(3, 5).pixels);
        assert_eq!(texture.sampling.filter, TextureFilter::Nearest);
    }

    #[test]
    fn test_empty_bitmap_gets_placeholder_texture() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let rasterizer = GlyphRasterizer::new(Sampling::default());

        let glyph = rasterizer.upload(&mut ctx, &bitmap(0, 0)).unwrap();
        assert_eq!((glyph.pixel_width, glyph.pixel_height), (0, 0));

        let texture = ctx.backend().texture(glyph.texture).unwrap();
        assert_eq!((texture.width, texture.height), (1, 1));
        assert_eq!(texture.pixels, vec![0]);
    }

    #[test]
    fn test_upload_failure_yields_no_glyph() {
        let mut backend = RecordingBackend::new();
        backend.fail_texture_uploads(true);
        let mut ctx = RenderContext::new(backend);
        let rasterizer = GlyphRasterizer::new(Sampling::default());

        let result = rasterizer.upload(&mut ctx, &bitmap(2, 2));
        assert!(matches!(result, Err(RasterizationError::Upload(_))));
        assert_eq!(ctx.backend().texture_count(), 0);
    }

    #[test]
    fn test_missing_font_creates_no_texture() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let rasterizer = GlyphRasterizer::new(Sampling::default());
        let path = std::env::temp_dir().join("glyph-quad-missing").join("Nope.ttf");

        let err = rasterizer.rasterize(&mut ctx, 'H', &path, 18).unwrap_err();
        assert!(err.is_face_load());
        assert!(ctx.backend().calls().is_empty());
    }

    #[test]
    fn test_zero_pixel_size_rejected() {
        let mut ctx = RenderContext::new(RecordingBackend::new());
        let rasterizer = GlyphRasterizer::new(Sampling::default());
        let path = std::env::temp_dir().join("whatever.ttf");

        let err = rasterizer.rasterize(&mut ctx, 'H', &path, 0).unwrap_err();
        assert!(matches!(err, RasterizationError::EngineInit(0)));
    }

    #[test]
    fn test_rasterize_h() {
        let font_path = test_font_path();

        let mut ctx = RenderContext::new(RecordingBackend::new());
        let rasterizer = GlyphRasterizer::new(Sampling::default());
        let glyph = rasterizer.rasterize(&mut ctx, 'H', &font_path, 18).unwrap();

        assert!(glyph.texture.id() != 0);
        assert_eq!((glyph.pixel_width, glyph.pixel_height), (11, 14));
        assert!(matches!(
            ctx.backend().calls(),
            [RecordedCall::CreateTexture { .. }]
        ));

        let quad = crate::quad::Quad::for_glyph(&glyph, 0.1);
        assert_eq!(quad.origin().0, -(glyph.pixel_width as f32 * 0.1) / 2.0);
    }

    #[test]
    fn test_rasterization_is_deterministic() {
        let font_path = test_font_path();

        for c in ' '..='~' {
            let first = match GlyphRasterizer::rasterize_bitmap(c, &font_path, 18) {
                Ok(bitmap) => bitmap,
                Err(e) => panic!("unexpected error for {c:?}: {e}"),
            };
            let second = GlyphRasterizer::rasterize_bitmap(c, &font_path, 18).unwrap();
            assert_eq!(first.metrics, second.metrics, "metrics differ for {c:?}");
            assert_eq!(first.pixels, second.pixels, "pixels differ for {c:?}");
        }
    }
}
