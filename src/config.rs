//! Application Configuration
//! Optional JSON file with dashboard defaults.

use crate::charts::{LineStyle, StyleConfig};
use crate::data::TextEncoding;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that points at a config file.
pub const CONFIG_ENV_VAR: &str = "VIZBOARD_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "vizboard.json";

/// Dashboard defaults. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub color: String,
    pub marker_size: u32,
    pub line_style: LineStyle,
    pub bin_count: u32,
    pub sample_count: usize,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Upper bound on lattice points per axis when drawing surfaces.
    pub surface_max_axis_points: usize,
    pub csv_encoding: TextEncoding,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            color: StyleConfig::DEFAULT_COLOR.to_string(),
            marker_size: StyleConfig::DEFAULT_MARKER_SIZE,
            line_style: LineStyle::Solid,
            bin_count: StyleConfig::DEFAULT_BIN_COUNT,
            sample_count: 200,
            chart_width: 900,
            chart_height: 600,
            surface_max_axis_points: 60,
            csv_encoding: TextEncoding::Utf8,
            preview_rows: 5,
        }
    }
}

impl AppConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(text)?;
        Ok(config)
    }

    /// Locate and load the config, falling back to defaults.
    pub fn discover() -> Self {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config: {:#}", e);
                Self::default()
            }
        }
    }

    /// Style built from the configured defaults. Falls back to the built-in
    /// style when the configured color is not a valid hex string.
    pub fn default_style(&self) -> StyleConfig {
        match StyleConfig::new(&self.color, self.marker_size, self.line_style, self.bin_count) {
            Ok(style) => style,
            Err(e) => {
                log::warn!("Invalid default style in config: {}", e);
                StyleConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "bin_count": 12, "line_style": "--" }"#).unwrap();
        assert_eq!(config.bin_count, 12);
        assert_eq!(config.line_style, LineStyle::Dashed);
        assert_eq!(config.sample_count, 200);
        assert_eq!(config.color, "#FF6347");
    }

    #[test]
    fn test_encoding_names() {
        let config = AppConfig::from_json(r#"{ "csv_encoding": "latin1" }"#).unwrap();
        assert_eq!(config.csv_encoding, TextEncoding::Latin1);
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_bad_color_falls_back_to_default_style() {
        let config = AppConfig {
            color: "tomato".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.default_style(), StyleConfig::default());
    }
}
