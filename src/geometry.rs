//! Geometry normalizer — scale-to-fit and centering of the source canvas.

use crate::model::*;

/// Compute the canvas-to-page mapping.
///
/// `margin` is the left page margin the drawable area starts at, and
/// `cursor_y` is the vertical position reached after header blocks; the
/// score starts there. The scale is capped at 1: scores are only ever shrunk.
pub fn normalize(
    canvas: &CanvasMetadata,
    area: DrawableArea,
    margin: f64,
    cursor_y: f64,
) -> PageGeometry {
    let (width, height) = effective_size(canvas);

    let scale = (area.width / width).min(area.height / height).min(1.0);

    PageGeometry {
        scale,
        offset_x: margin + (area.width - width * scale) / 2.0,
        offset_y: cursor_y,
    }
}

/// Canvas size with zero or nonsensical dimensions replaced by the defaults.
pub fn effective_size(canvas: &CanvasMetadata) -> (f64, f64) {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    let width = if usable(canvas.width) { canvas.width } else { DEFAULT_CANVAS_WIDTH };
    let height = if usable(canvas.height) { canvas.height } else { DEFAULT_CANVAS_HEIGHT };
    (width, height)
}
