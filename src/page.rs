//! Draw instructions — the contract between the page composer and a
//! [`PageEngine`](crate::pdf::PageEngine).
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page and y growing downwards, matching the SVG input. Text `y` is the
//! baseline.

use serde::{Deserialize, Serialize};

/// A single page, ready to be handed to a page engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    pub width: f64,
    pub height: f64,
    pub info: DocumentInfo,
    /// Executed strictly in order
    pub instructions: Vec<DrawInstruction>,
}

impl PageDocument {
    /// Number of path and text draws; state and transform changes excluded.
    pub fn draw_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_draw()).count()
    }
}

/// Embedded document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub creator: String,
    /// Local creation time, `chrono` RFC 3339
    pub created: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawInstruction {
    /// Push the graphics state (transform and paint settings).
    SaveState,
    /// Pop the graphics state pushed by the matching `SaveState`.
    RestoreState,
    /// Translate, then scale uniformly; composes with the current transform.
    Transform {
        translate_x: f64,
        translate_y: f64,
        scale: f64,
    },
    /// SVG path data. Neither fill nor stroke still defines the path.
    Path {
        commands: String,
        fill: Option<String>,
        stroke: Option<Stroke>,
    },
    Text(TextRun),
}

impl DrawInstruction {
    pub fn is_draw(&self) -> bool {
        matches!(self, DrawInstruction::Path { .. } | DrawInstruction::Text(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

/// A single unbroken line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub font_family: String,
    pub align: TextAlign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    /// `x` is where the run starts
    Left,
    /// `x` is the horizontal center of the run
    Center,
}
