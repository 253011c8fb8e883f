//! Page engine — executes a [`PageDocument`] and writes a single-page PDF.
//!
//! Draw instructions use a top-left origin; the content stream starts by
//! flipping the y axis so instructions can be emitted unchanged. Text runs
//! get a matching flip in their text matrix so glyphs stay upright.

mod color;
mod fonts;
mod path_data;

use std::collections::BTreeSet;

use chrono::DateTime;
use lopdf::{
    content::{Content, Operation},
    dictionary, Dictionary, Document, Object, Stream, StringFormat,
};
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::page::*;
use color::{parse_color, Rgb};
use fonts::{encode_win_ansi, StandardFont};
use path_data::{parse_path_data, Segment};

/// Anything that can turn a composed page into a finished binary document.
pub trait PageEngine: Send + Sync {
    fn render_page(&self, page: &PageDocument) -> Result<Vec<u8>, RenderError>;
}

/// Writes PDF 1.5 with `lopdf`, using the standard-14 fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfEngine;

impl PageEngine for PdfEngine {
    fn render_page(&self, page: &PageDocument) -> Result<Vec<u8>, RenderError> {
        let (operations, fonts) = content_operations(page)?;
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::PageEngine(format!("content stream: {e}")))?;

        let mut doc = Document::with_version("1.5");
        let id_pages = doc.new_object_id();

        let mut font_dict = Dictionary::new();
        for font in &fonts {
            let id_font = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            font_dict.set(font.resource_name(), id_font);
        }
        let id_resources = doc.add_object(dictionary! {
            "Font" => font_dict,
        });

        let id_content = doc.add_object(Stream::new(dictionary! {}, content));
        let id_page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => id_pages,
            "Contents" => id_content,
            "Resources" => id_resources,
        });

        doc.set_object(
            id_pages,
            dictionary! {
                "Type" => "Pages",
                "Count" => 1,
                "Kids" => vec![id_page.into()],
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    real(page.width),
                    real(page.height),
                ],
            },
        );

        let id_catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => id_pages,
        });
        doc.trailer.set("Root", id_catalog);

        let id_info = doc.add_object(info_dictionary(&page.info));
        doc.trailer.set("Info", id_info);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::PageEngine(format!("failed to write PDF: {e}")))?;
        debug!(bytes = buffer.len(), fonts = fonts.len(), "wrote PDF page");
        Ok(buffer)
    }
}

/// Translate the instruction list into content stream operations, also
/// returning the fonts the page needs as resources.
pub(crate) fn content_operations(
    page: &PageDocument,
) -> Result<(Vec<Operation>, BTreeSet<StandardFont>), RenderError> {
    let mut ops = Vec::new();
    let mut fonts = BTreeSet::new();

    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("cm", matrix(1.0, -1.0, 0.0, page.height)));

    for instruction in &page.instructions {
        match instruction {
            DrawInstruction::SaveState => ops.push(Operation::new("q", vec![])),
            DrawInstruction::RestoreState => ops.push(Operation::new("Q", vec![])),
            DrawInstruction::Transform {
                translate_x,
                translate_y,
                scale,
            } => ops.push(Operation::new(
                "cm",
                matrix(*scale, *scale, *translate_x, *translate_y),
            )),
            DrawInstruction::Path {
                commands,
                fill,
                stroke,
            } => path_operations(commands, fill.as_deref(), stroke.as_ref(), &mut ops)?,
            DrawInstruction::Text(run) => {
                let font = StandardFont::from_family(&run.font_family);
                fonts.insert(font);
                text_operations(run, font, &mut ops);
            }
        }
    }

    ops.push(Operation::new("Q", vec![]));
    Ok((ops, fonts))
}

fn path_operations(
    commands: &str,
    fill: Option<&str>,
    stroke: Option<&Stroke>,
    ops: &mut Vec<Operation>,
) -> Result<(), RenderError> {
    let segments = parse_path_data(commands)?;

    if let Some(fill) = fill {
        let Rgb(r, g, b) = paint_color(fill);
        ops.push(Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]));
    }
    if let Some(stroke) = stroke {
        let Rgb(r, g, b) = paint_color(&stroke.color);
        ops.push(Operation::new("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)]));
        ops.push(Operation::new("w", vec![real(stroke.width)]));
    }

    for segment in segments {
        let op = match segment {
            Segment::MoveTo(x, y) => Operation::new("m", vec![real(x), real(y)]),
            Segment::LineTo(x, y) => Operation::new("l", vec![real(x), real(y)]),
            Segment::CurveTo(x1, y1, x2, y2, x, y) => Operation::new(
                "c",
                vec![real(x1), real(y1), real(x2), real(y2), real(x), real(y)],
            ),
            Segment::Close => Operation::new("h", vec![]),
        };
        ops.push(op);
    }

    // `n` ends the path without painting it.
    let paint = match (fill.is_some(), stroke.is_some()) {
        (true, true) => "B",
        (true, false) => "f",
        (false, true) => "S",
        (false, false) => "n",
    };
    ops.push(Operation::new(paint, vec![]));
    Ok(())
}

fn text_operations(run: &TextRun, font: StandardFont, ops: &mut Vec<Operation>) {
    let x = match run.align {
        TextAlign::Left => run.x,
        TextAlign::Center => run.x - font.text_width(&run.content, run.font_size) / 2.0,
    };

    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("g", vec![Object::Integer(0)]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.resource_name().as_bytes().to_vec()), real(run.font_size)],
    ));
    // Undo the page flip for glyphs.
    ops.push(Operation::new("Tm", matrix(1.0, -1.0, x, run.y)));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(&run.content), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn paint_color(value: &str) -> Rgb {
    parse_color(value).unwrap_or_else(|| {
        warn!(color = value, "unrecognized color, painting black");
        Rgb::BLACK
    })
}

fn matrix(sx: f64, sy: f64, tx: f64, ty: f64) -> Vec<Object> {
    vec![real(sx), Object::Integer(0), Object::Integer(0), real(sy), real(tx), real(ty)]
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn info_dictionary(info: &DocumentInfo) -> Dictionary {
    let mut dict = dictionary! {
        "Title" => text_string(&info.title),
        "Author" => text_string(&info.author),
        "Creator" => text_string(&info.creator),
        "Producer" => text_string(&info.creator),
    };
    if let Some(date) = pdf_date(&info.created) {
        dict.set("CreationDate", Object::string_literal(date));
    }
    dict
}

/// PDF text string: literal for ASCII, UTF-16BE with a byte order mark otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        Object::string_literal(s)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in s.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// RFC 3339 timestamp to a PDF date, e.g. `D:20240309140500+01'00'`.
fn pdf_date(rfc3339: &str) -> Option<String> {
    let date = DateTime::parse_from_rfc3339(rfc3339).ok()?;
    let offset = date.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();
    Some(format!(
        "D:{}{}{:02}'{:02}'",
        date.format("%Y%m%d%H%M%S"),
        sign,
        offset / 3600,
        offset % 3600 / 60
    ))
}
