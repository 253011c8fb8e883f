//! Vector document parser — converts renderer SVG output into a
//! [`VectorDocument`].

use roxmltree::{Document, Node};
use tracing::debug;

use crate::error::ParseError;
use crate::model::*;

/// Containers whose children are referenced, never painted in place.
const NON_RENDERED: &[&str] = &["defs", "clipPath", "mask", "symbol", "pattern", "marker"];

/// Parse an SVG string into a VectorDocument.
pub fn parse_vector_document(svg: &str) -> Result<VectorDocument, ParseError> {
    // Renderer output may carry a DOCTYPE declaration
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(svg, options)
        .map_err(|e| ParseError::Xml(e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().name() != "svg" {
        return Err(ParseError::NotSvg(root.tag_name().name().to_string()));
    }

    let canvas = parse_canvas(&root);
    let mut primitives = Vec::new();
    walk(&root, &mut primitives);

    let document = VectorDocument { canvas, primitives };
    debug!(
        width = document.canvas.width,
        height = document.canvas.height,
        paths = document.path_count(),
        texts = document.text_count(),
        "parsed vector document"
    );
    Ok(document)
}

// ─── Canvas ──────────────────────────────────────────────────────────

fn parse_canvas(root: &Node) -> CanvasMetadata {
    CanvasMetadata {
        view_box: root.attribute("viewBox").map(String::from),
        width: root
            .attribute("width")
            .and_then(parse_length)
            .unwrap_or(DEFAULT_CANVAS_WIDTH),
        height: root
            .attribute("height")
            .and_then(parse_length)
            .unwrap_or(DEFAULT_CANVAS_HEIGHT),
    }
}

/// Parse a positive length, accepting a `px` or `pt` suffix.
fn parse_length(s: &str) -> Option<f64> {
    let s = s.trim();
    let number = s
        .strip_suffix("px")
        .or_else(|| s.strip_suffix("pt"))
        .unwrap_or(s);
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

// ─── Traversal ───────────────────────────────────────────────────────

/// Depth-first, pre-order walk. Output order is paint order.
fn walk(node: &Node, out: &mut Vec<VectorPrimitive>) {
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "path" => {
                if let Some(path) = parse_path(&child) {
                    out.push(VectorPrimitive::Path(path));
                }
            }
            "text" => {
                if let Some(text) = parse_text(&child) {
                    out.push(VectorPrimitive::Text(text));
                }
            }
            name if NON_RENDERED.contains(&name) => {}
            _ => walk(&child, out),
        }
    }
}

// ─── Path ────────────────────────────────────────────────────────────

fn parse_path(node: &Node) -> Option<PathPrimitive> {
    let d = node.attribute("d")?;
    if d.trim().is_empty() {
        return None;
    }

    let mut path = PathPrimitive::new(d);
    if let Some(stroke) = presentation(node, "stroke") {
        path.stroke_color = stroke.to_string();
    }
    if let Some(width) = presentation(node, "stroke-width").and_then(parse_number) {
        path.stroke_width = width.max(0.0);
    }
    if let Some(fill) = presentation(node, "fill") {
        path.fill_color = fill.to_string();
    }
    Some(path)
}

// ─── Text ────────────────────────────────────────────────────────────

fn parse_text(node: &Node) -> Option<TextPrimitive> {
    let content: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    let x = node.attribute("x").and_then(first_coordinate).unwrap_or(0.0);
    let y = node.attribute("y").and_then(first_coordinate).unwrap_or(0.0);

    let mut text = TextPrimitive::new(content, x, y);
    if let Some(size) = presentation(node, "font-size").and_then(parse_length) {
        text.font_size = size;
    }
    if let Some(family) = presentation(node, "font-family") {
        let family = family.trim();
        if !family.is_empty() {
            text.font_family = family.to_string();
        }
    }
    Some(text)
}

/// `x`/`y` on text may be a list of per-glyph positions; the run starts at the first.
fn first_coordinate(s: &str) -> Option<f64> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .find(|t| !t.is_empty())
        .and_then(parse_number)
}

// ─── Attribute helpers ───────────────────────────────────────────────

/// Look up a presentation property. An inline `style` declaration wins
/// over the attribute of the same name.
fn presentation<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    style_property(node, name).or_else(|| node.attribute(name))
}

fn style_property<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute("style")?
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let number = s
        .strip_suffix("px")
        .or_else(|| s.strip_suffix("pt"))
        .unwrap_or(s);
    number.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
