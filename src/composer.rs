//! Page composer — lays out the header blocks, the scaled score and the
//! footer as an ordered list of draw instructions.
//!
//! Layout runs top to bottom with a vertical cursor. The score is placed
//! wherever the cursor ends up after the title and composer blocks, so the
//! geometry is normalized a second time once the header height is known.

use std::fmt::Write;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::config::{PageLayout, DEFAULT_TIMESTAMP_FORMAT};
use crate::geometry::normalize;
use crate::model::*;
use crate::page::*;

pub const DEFAULT_TITLE: &str = "Music Sheet";
pub const DEFAULT_AUTHOR: &str = "Unknown";
pub const CREATOR: &str = concat!("scorepdf ", env!("CARGO_PKG_VERSION"));

const HEADER_FONT_FAMILY: &str = "Helvetica";
const TITLE_FONT_SIZE: f64 = 20.0;
const COMPOSER_FONT_SIZE: f64 = 14.0;
const FOOTER_FONT_SIZE: f64 = 8.0;
/// Line height as a multiple of the font size
const LINE_SPACING: f64 = 1.2;

pub struct PageComposer<'a> {
    layout: &'a PageLayout,
    timestamp_format: &'a str,
}

impl<'a> PageComposer<'a> {
    pub fn new(layout: &'a PageLayout, timestamp_format: &'a str) -> Self {
        Self {
            layout,
            timestamp_format,
        }
    }

    /// Build the page for `doc`.
    ///
    /// `geometry` supplies the initial normalization; its `offset_y` is
    /// replaced by the cursor position below the header blocks.
    pub fn compose(
        &self,
        doc: &VectorDocument,
        geometry: PageGeometry,
        options: &DocumentOptions,
        generated_at: &DateTime<Local>,
    ) -> PageDocument {
        let layout = self.layout;
        let center_x = layout.width / 2.0;
        let mut instructions = Vec::with_capacity(doc.primitives.len() + 8);
        let mut cursor = layout.margin;

        let title = supplied(&options.title);
        let composer = supplied(&options.composer);

        if let Some(title) = title {
            instructions.push(header_text(title, center_x, cursor, TITLE_FONT_SIZE));
            cursor += line_height(TITLE_FONT_SIZE) * 1.5;
        }

        if let Some(composer) = composer {
            let label = format!("Composer: {composer}");
            instructions.push(header_text(&label, center_x, cursor, COMPOSER_FONT_SIZE));
            cursor += line_height(COMPOSER_FONT_SIZE) * 2.0;
        }

        // Second pass: the score starts below whatever the header used.
        let placed = normalize(&doc.canvas, layout.drawable_area(), layout.margin, cursor);
        debug!(
            initial_offset_y = geometry.offset_y,
            scale = placed.scale,
            offset_x = placed.offset_x,
            offset_y = placed.offset_y,
            "placed score"
        );

        instructions.push(DrawInstruction::SaveState);
        instructions.push(DrawInstruction::Transform {
            translate_x: placed.offset_x,
            translate_y: placed.offset_y,
            scale: placed.scale,
        });
        for primitive in &doc.primitives {
            instructions.push(primitive_instruction(primitive));
        }
        instructions.push(DrawInstruction::RestoreState);

        instructions.push(DrawInstruction::Text(TextRun {
            content: self.footer(generated_at),
            x: center_x,
            y: layout.height - layout.margin,
            font_size: FOOTER_FONT_SIZE,
            font_family: HEADER_FONT_FAMILY.into(),
            align: TextAlign::Center,
        }));

        PageDocument {
            width: layout.width,
            height: layout.height,
            info: DocumentInfo {
                title: title.unwrap_or(DEFAULT_TITLE).to_string(),
                author: composer.unwrap_or(DEFAULT_AUTHOR).to_string(),
                creator: CREATOR.into(),
                created: generated_at.to_rfc3339(),
            },
            instructions,
        }
    }

    fn footer(&self, generated_at: &DateTime<Local>) -> String {
        let mut footer = String::from("Generated on ");
        let prefix = footer.len();
        if write!(footer, "{}", generated_at.format(self.timestamp_format)).is_err() {
            warn!("invalid timestamp format, using the default");
            footer.truncate(prefix);
            footer.push_str(&generated_at.format(DEFAULT_TIMESTAMP_FORMAT).to_string());
        }
        footer
    }
}

/// A caller-supplied header value; blank counts as absent.
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn line_height(font_size: f64) -> f64 {
    font_size * LINE_SPACING
}

/// Centered header line whose top sits at `top`.
fn header_text(content: &str, center_x: f64, top: f64, font_size: f64) -> DrawInstruction {
    DrawInstruction::Text(TextRun {
        content: content.to_string(),
        x: center_x,
        y: top + font_size,
        font_size,
        font_family: HEADER_FONT_FAMILY.into(),
        align: TextAlign::Center,
    })
}

fn primitive_instruction(primitive: &VectorPrimitive) -> DrawInstruction {
    match primitive {
        VectorPrimitive::Path(path) => DrawInstruction::Path {
            commands: path.commands.clone(),
            fill: paint(&path.fill_color),
            stroke: paint(&path.stroke_color).map(|color| Stroke {
                color,
                width: path.stroke_width,
            }),
        },
        VectorPrimitive::Text(text) => DrawInstruction::Text(TextRun {
            content: text.content.clone(),
            x: text.x,
            y: text.y,
            font_size: text.font_size,
            font_family: text.font_family.clone(),
            align: TextAlign::Left,
        }),
    }
}

fn paint(value: &str) -> Option<String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case(PAINT_NONE) {
        None
    } else {
        Some(value.to_string())
    }
}
