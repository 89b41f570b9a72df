//! Viewer configuration
//!
//! Loaded from an optional JSON file; every field has a default so partial
//! files are accepted. CLI flags are applied on top in `main`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{Result, ViewerError};
use crate::render::ColorScheme;

/// Which of the two viewer layouts is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewerVariant {
    /// Embedded result view: narrower initial window, larger tiles
    Inline,
    /// Pop-out view opened for a single job
    FullScreen,
}

impl Default for ViewerVariant {
    fn default() -> Self {
        Self::Inline
    }
}

/// How the alignment is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Tile view rendering only the rows near the viewport
    Virtualized,
    /// Tile view rendering every row
    Interactive,
    /// Raw alignment text
    Text,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::Virtualized
    }
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [Self::Virtualized, Self::Interactive, Self::Text];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Virtualized => "Interactive (Virtualized)",
            Self::Interactive => "Interactive (Legacy)",
            Self::Text => "Text",
        }
    }
}

/// Row virtualization and display-window parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Height of one alignment row in pixels
    pub row_height: f32,
    /// Extra rows rendered above and below the viewport
    pub overscan: usize,
    /// Never render fewer rows than this
    pub min_visible_rows: usize,
    /// Half-width of the initial display window, in columns
    pub half_window: usize,
    /// Smallest allowed display window width
    pub min_window: usize,
    pub pan_fraction: f64,
    pub zoom_fraction: f64,
    /// Rows moved per ArrowUp/ArrowDown
    pub scroll_step_rows: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            row_height: 36.0,
            overscan: 10,
            min_visible_rows: 30,
            half_window: 25,
            min_window: 10,
            pan_fraction: 0.1,
            zoom_fraction: 0.2,
            scroll_step_rows: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub tile_width: f32,
    pub tile_height: f32,
    /// Height of one lane in the variant track
    pub lane_height: f32,
    /// Pixels reserved per character of the longest row name
    pub label_char_width: f32,
    pub ruler_height: f32,
    pub conservation_height: f32,
    pub color_scheme: ColorScheme,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_width: 22.0,
            tile_height: 32.0,
            lane_height: 15.0,
            label_char_width: 9.0,
            ruler_height: 40.0,
            conservation_height: 60.0,
            color_scheme: ColorScheme::Clustal2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_entries: 100,
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub variant: ViewerVariant,
    pub display_mode: DisplayMode,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
    pub cache: CacheConfig,
    pub resize_debounce_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            variant: ViewerVariant::Inline,
            display_mode: DisplayMode::Virtualized,
            viewport: ViewportConfig::default(),
            render: RenderConfig::default(),
            cache: CacheConfig::default(),
            resize_debounce_ms: 100,
        }
    }
}

impl ViewerConfig {
    /// Defaults for the pop-out view: wider initial window, smaller tiles.
    pub fn full_screen() -> Self {
        let mut config = Self::default();
        config.apply_variant(ViewerVariant::FullScreen);
        config
    }

    pub fn apply_variant(&mut self, variant: ViewerVariant) {
        self.variant = variant;
        match variant {
            ViewerVariant::Inline => {
                self.viewport.half_window = 25;
                self.render.tile_width = 22.0;
                self.render.tile_height = 32.0;
            }
            ViewerVariant::FullScreen => {
                self.viewport.half_window = 50;
                self.render.tile_width = 20.0;
                self.render.tile_height = 30.0;
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_json_over(&Self::default(), text)
    }

    /// Parse `text` with every field it leaves out taken from `base`
    pub fn from_json_over(base: &Self, text: &str) -> Result<Self> {
        let mut merged = serde_json::to_value(base)?;
        let overrides: Value = serde_json::from_str(text)?;
        merge_json(&mut merged, overrides);
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::load_over(&Self::default(), path)
    }

    pub fn load_over(base: &Self, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ViewerError::io(path, e))?;
        Self::from_json_over(base, &text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.viewport.row_height > 0.0) {
            return Err(ViewerError::config("viewport.row_height must be positive"));
        }
        if self.viewport.min_window == 0 {
            return Err(ViewerError::config("viewport.min_window must be at least 1"));
        }
        if self.viewport.half_window * 2 < self.viewport.min_window {
            return Err(ViewerError::config(
                "viewport.half_window must be at least half of viewport.min_window",
            ));
        }
        if !(self.render.lane_height > 0.0) {
            return Err(ViewerError::config("render.lane_height must be positive"));
        }
        Ok(())
    }
}

fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, value) => *base = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ViewerConfig::from_json(r#"{"viewport": {"overscan": 4}}"#).unwrap();
        assert_eq!(config.viewport.overscan, 4);
        assert_eq!(config.viewport.row_height, 36.0);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.resize_debounce_ms, 100);
    }

    #[test]
    fn test_rejects_zero_row_height() {
        let err = ViewerConfig::from_json(r#"{"viewport": {"row_height": 0.0}}"#).unwrap_err();
        assert!(matches!(err, ViewerError::Config { .. }));
    }

    #[test]
    fn test_rejects_half_window_below_minimum() {
        let err = ViewerConfig::from_json(r#"{"viewport": {"half_window": 0}}"#).unwrap_err();
        assert!(matches!(err, ViewerError::Config { .. }));
        let err = ViewerConfig::from_json(r#"{"viewport": {"half_window": 4}}"#).unwrap_err();
        assert!(matches!(err, ViewerError::Config { .. }));
        assert!(ViewerConfig::from_json(r#"{"viewport": {"half_window": 5}}"#).is_ok());
    }

    #[test]
    fn test_full_screen_variant() {
        let config = ViewerConfig::full_screen();
        assert_eq!(config.variant, ViewerVariant::FullScreen);
        assert_eq!(config.viewport.half_window, 50);
        assert_eq!(config.render.tile_width, 20.0);
    }

    #[test]
    fn test_file_settings_survive_full_screen_defaults() {
        let config = ViewerConfig::from_json_over(
            &ViewerConfig::full_screen(),
            r#"{"render": {"tile_width": 18.0}, "viewport": {"overscan": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.render.tile_width, 18.0);
        assert_eq!(config.render.tile_height, 30.0);
        assert_eq!(config.viewport.half_window, 50);
        assert_eq!(config.viewport.overscan, 4);
        assert_eq!(config.variant, ViewerVariant::FullScreen);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ViewerConfig::load(Path::new("/nonexistent/pavi.json")).unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));
    }
}
