// ABOUTME: Scoped font engine and face wrappers around fontdue.
// ABOUTME: A face borrows its engine, so it is always released first.

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};

use crate::rasterizer::{GlyphBitmap, GlyphMetrics, RasterizationError};

/// Rendering engine configured for one pixel size.
#[derive(Debug)]
pub struct FontEngine {
    pixel_size: u32,
}

impl FontEngine {
    pub fn init(pixel_size: u32) -> Result<Self, RasterizationError> {
        if pixel_size == 0 {
            return Err(RasterizationError::EngineInit(pixel_size));
        }
        tracing::debug!("Font engine initialized at {}px", pixel_size);
        Ok(Self { pixel_size })
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Read and parse a TrueType/OpenType face
    pub fn load_face(&self, path: &Path) -> Result<FontFace<'_>, RasterizationError> {
        let data = std::fs::read(path).map_err(|source| RasterizationError::FaceLoad {
            path: path.to_path_buf(),
            source,
        })?;

        // fontdue optimizes its outlines for the size given here
        let settings = FontSettings {
            scale: self.pixel_size as f32,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(data, settings).map_err(|reason| {
            RasterizationError::FaceParse {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            }
        })?;

        tracing::debug!(
            "Loaded font face {} ({} glyphs)",
            path.display(),
            font.glyph_count()
        );

        Ok(FontFace {
            engine: self,
            font,
            path: path.to_path_buf(),
        })
    }
}

/// A parsed face. Dropping it frees the parsed `Font`; it cannot outlive
/// the engine it was loaded from.
pub struct FontFace<'e> {
    engine: &'e FontEngine,
    font: Font,
    path: PathBuf,
}

impl FontFace<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rasterize `character` to an anti-aliased coverage bitmap.
    pub fn render(&self, character: char) -> Result<GlyphBitmap, RasterizationError> {
        let index = self.font.lookup_glyph_index(character);
        if index == 0 {
            return Err(RasterizationError::GlyphLoad {
                character,
                reason: "not present in font".to_string(),
            });
        }

        let (metrics, pixels) = self
            .font
            .rasterize_indexed(index, self.engine.pixel_size as f32);

        if pixels.len() != metrics.width * metrics.height {
            return Err(RasterizationError::GlyphLoad {
                character,
                reason: format!(
                    "bitmap has {} bytes for a {}x{} glyph",
                    pixels.len(),
                    metrics.width,
                    metrics.height
                ),
            });
        }

        // fontdue reports the bitmap's bottom edge (ymin); the top bearing is
        // measured from the baseline up to the first row.
        let metrics = GlyphMetrics {
            pixel_width: metrics.width as u32,
            pixel_height: metrics.height as u32,
            bearing_left: metrics.xmin,
            bearing_top: metrics.ymin + metrics.height as i32,
            advance_units: (metrics.advance_width * 64.0).round().max(0.0) as u32,
        };

        Ok(GlyphBitmap { metrics, pixels })
    }
}

/// DejaVu Sans, shipped under `assets/fonts` for tests
#[cfg(test)]
pub(crate) fn test_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/fonts/DejaVuSans.ttf")
}
