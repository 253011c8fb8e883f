//! Error types for the transcoding pipeline.
//!
//! Each stage has its own error type. The façade folds all of them into
//! [`ConversionError`], which records the [`Stage`] that failed. Validation
//! errors are the exception: they are surfaced verbatim so callers can show
//! the message to the user unchanged.
//!
//! None of these messages ever contain the notation text itself.

use std::fmt;
use thiserror::Error;

/// Notation was rejected before any rendering took place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Notation must be a non-empty string")]
    Empty,

    #[error("Notation contains potentially unsafe content")]
    UnsafeContent,
}

/// Rendering failed, either in the notation renderer or in the page engine.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The notation renderer could not interpret the input.
    #[error("Failed to render notation: {0}")]
    Notation(String),

    /// The renderer's document context could not be installed.
    #[error("Failed to set up render context: {0}")]
    Context(String),

    /// Spawning or talking to the renderer process failed.
    #[error("Renderer I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The page engine rejected a draw instruction or failed to write output.
    #[error("Page engine error: {0}")]
    PageEngine(String),
}

impl From<PathDataError> for RenderError {
    fn from(e: PathDataError) -> Self {
        RenderError::PageEngine(e.to_string())
    }
}

/// The vector document had no recognizable structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Vector document is not well-formed XML: {0}")]
    Xml(String),

    #[error("Unsupported root element: '{0}'. Expected 'svg'.")]
    NotSvg(String),
}

/// Malformed SVG path data, reported with the byte offset where it failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid path data at offset {offset}: {reason}")]
pub struct PathDataError {
    pub offset: usize,
    pub reason: String,
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Pipeline stage a [`ConversionError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Validation,
    Render,
    Parse,
    Layout,
    PageEngine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Config => "configuration",
            Stage::Validation => "validation",
            Stage::Render => "render",
            Stage::Parse => "parse",
            Stage::Layout => "layout",
            Stage::PageEngine => "page engine",
        };
        f.write_str(name)
    }
}

/// The single error type returned by the transcoder façade.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Conversion failed at {stage} stage: {message}")]
    Failed { stage: Stage, message: String },
}

impl ConversionError {
    pub fn stage(&self) -> Stage {
        match self {
            ConversionError::Validation(_) => Stage::Validation,
            ConversionError::Failed { stage, .. } => *stage,
        }
    }

    pub(crate) fn at(stage: Stage, err: impl fmt::Display) -> Self {
        ConversionError::Failed {
            stage,
            message: err.to_string(),
        }
    }
}

impl From<ParseError> for ConversionError {
    fn from(e: ParseError) -> Self {
        ConversionError::at(Stage::Parse, e)
    }
}

impl From<ConfigError> for ConversionError {
    fn from(e: ConfigError) -> Self {
        ConversionError::at(Stage::Config, e)
    }
}
