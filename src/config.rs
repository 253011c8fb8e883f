//! Transcoder configuration: page layout and the external renderer command.
//!
//! Every field has a default, so `TranscoderConfig::default()` produces an
//! A4 page with 50pt margins. Configs can also be loaded from JSON or from
//! the environment.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::DrawableArea;

/// Environment variable naming the renderer program.
pub const RENDERER_ENV: &str = "SCOREPDF_RENDERER";
/// Environment variable holding whitespace-separated renderer arguments.
pub const RENDERER_ARGS_ENV: &str = "SCOREPDF_RENDERER_ARGS";

// ── Page & margins (points) ─────────────────────────────────────────
pub const A4_WIDTH: f64 = 595.0;
pub const A4_HEIGHT: f64 = 842.0;
pub const PAGE_MARGIN: f64 = 50.0;
pub const HEADER_HEIGHT: f64 = 100.0;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed page size and the space reserved around the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    /// Margin on all four sides
    pub margin: f64,
    /// Vertical space reserved for title and composer
    pub header_height: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: PAGE_MARGIN,
            header_height: HEADER_HEIGHT,
        }
    }
}

impl PageLayout {
    /// Area left for the score once margins and the header are taken out.
    pub fn drawable_area(&self) -> DrawableArea {
        DrawableArea {
            width: self.width - 2.0 * self.margin,
            height: self.height - 2.0 * self.margin - self.header_height,
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        let area = self.drawable_area();
        if !(area.width > 0.0 && area.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "page {}x{} leaves no drawable area with margin {} and header {}",
                self.width, self.height, self.margin, self.header_height
            )));
        }
        Ok(())
    }
}

/// External notation renderer invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Program that reads notation on stdin and writes SVG to stdout
    pub program: Option<String>,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscoderConfig {
    pub layout: PageLayout,
    pub renderer: RendererConfig,
    /// `chrono` format string for the footer timestamp
    pub timestamp_format: String,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            layout: PageLayout::default(),
            renderer: RendererConfig::default(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.into(),
        }
    }
}

impl TranscoderConfig {
    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TranscoderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Default config with the renderer command taken from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = TranscoderConfig::default();
        if let Ok(program) = std::env::var(RENDERER_ENV) {
            let program = program.trim();
            if !program.is_empty() {
                config.renderer.program = Some(program.to_string());
            }
        }
        if let Ok(args) = std::env::var(RENDERER_ARGS_ENV) {
            config.renderer.args = args.split_whitespace().map(String::from).collect();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.check()?;
        if self.timestamp_format.trim().is_empty() {
            return Err(ConfigError::Invalid("timestamp_format must not be empty".into()));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid(format!(
                "timestamp_format {:?} is not a valid strftime pattern",
                self.timestamp_format
            )));
        }
        Ok(())
    }
}
