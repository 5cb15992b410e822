// ABOUTME: RGBA color value used for the frame clear.
// ABOUTME: Plain f32 channels in 0.0..=1.0, serializable for config files.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Dark green clear color behind the glyph
    pub const BACKGROUND: Self = Self::rgb(0.2, 0.4, 0.2);
}

impl Default for Color {
    fn default() -> Self {
        Self::BACKGROUND
    }
}
