//! Data model for a parsed vector document and the page it is projected onto.
//!
//! A [`VectorDocument`] is produced once per conversion by the parser and
//! consumed by the composer; nothing here is cached across requests.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_WIDTH: f64 = 600.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 800.0;

pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
pub const DEFAULT_FILL_COLOR: &str = "none";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Paint value meaning "do not paint".
pub const PAINT_NONE: &str = "none";

/// A complete vector document: its canvas plus drawables in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    /// Canvas size hint, always present (defaults substituted by the parser)
    pub canvas: CanvasMetadata,
    /// Drawables in document order; later ones paint over earlier ones
    pub primitives: Vec<VectorPrimitive>,
}

impl VectorDocument {
    pub fn path_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, VectorPrimitive::Path(_)))
            .count()
    }

    pub fn text_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, VectorPrimitive::Text(_)))
            .count()
    }
}

/// Declared size of the source canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasMetadata {
    /// Raw `viewBox` value, kept verbatim
    pub view_box: Option<String>,
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasMetadata {
    fn default() -> Self {
        Self {
            view_box: None,
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// A single drawable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VectorPrimitive {
    Path(PathPrimitive),
    Text(TextPrimitive),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPrimitive {
    /// SVG path data (`d` attribute), passed through unmodified
    pub commands: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    /// Fill color, `"none"` for no fill
    pub fill_color: String,
}

impl PathPrimitive {
    pub fn new(commands: impl Into<String>) -> Self {
        Self {
            commands: commands.into(),
            stroke_color: DEFAULT_STROKE_COLOR.into(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            fill_color: DEFAULT_FILL_COLOR.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrimitive {
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub font_family: String,
}

impl TextPrimitive {
    pub fn new(content: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            content: content.into(),
            x,
            y,
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.into(),
        }
    }
}

/// Scale and offset that map canvas coordinates onto the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Uniform scale factor, in (0, 1]
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Width and height available to the score after margins and header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawableArea {
    pub width: f64,
    pub height: f64,
}

/// Caller-supplied document options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOptions {
    pub title: Option<String>,
    pub composer: Option<String>,
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_composer(mut self, composer: impl Into<String>) -> Self {
        self.composer = Some(composer.into());
        self
    }
}

/// Finished binary document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOutput {
    pub bytes: Vec<u8>,
    /// Size of `bytes` in bytes
    pub size: usize,
}

impl TranscodeOutput {
    pub fn new(bytes: Vec<u8>) -> Self {
        let size = bytes.len();
        Self { bytes, size }
    }
}
