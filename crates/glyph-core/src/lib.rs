// ABOUTME: Shared types and configuration for glyph-quad.
// ABOUTME: Defines colors, 4x4 matrix math, viewports, and config file handling.

pub mod color;
pub mod config;
pub mod math;

pub use color::Color;
pub use config::{Config, ConfigError, TextureFilter, WindowSettings};
pub use math::{Mat4, OrthoVolume, Viewport};
