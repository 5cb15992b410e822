// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves window and sampling settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Texture filtering used when sampling the glyph bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFilter {
    /// Hard pixel edges
    #[default]
    Nearest,
    Linear,
}

/// Window creation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    /// Logical size
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub always_on_top: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "glyph-quad".to_string(),
            width: 640,
            height: 480,
            resizable: false,
            always_on_top: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glyph texture sampling
    pub texture_filter: TextureFilter,

    pub window: WindowSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

impl Config {
    /// Get the default config file path (~/.config/glyph-quad/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glyph-quad").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_window() {
        let config = Config::default();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
        assert!(!config.window.resizable);
        assert!(config.window.always_on_top);
        assert_eq!(config.texture_filter, TextureFilter::Nearest);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
texture_filter = "linear"

[window]
title = "H"
"#,
        )
        .unwrap();

        assert_eq!(config.texture_filter, TextureFilter::Linear);
        assert_eq!(config.window.title, "H");
        assert_eq!(config.window.width, 640);
        assert!(config.window.always_on_top);
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let result: Result<Config, _> = toml::from_str("texture_filter = \"cubic\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.window.width = 800;
        config.texture_filter = TextureFilter::Linear;

        let temp_path = std::env::temp_dir()
            .join("glyph-quad-test")
            .join("config.toml");
        config.save(&temp_path).unwrap();

        let loaded = Config::load(&temp_path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_default_path() {
        if let Some(p) = Config::default_path() {
            assert!(p.ends_with("glyph-quad/config.toml"));
        }
    }
}
