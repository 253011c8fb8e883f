//! scorepdf — turns text music notation into a single-page, print-ready PDF.
//!
//! An external renderer engraves the notation as SVG; the SVG is parsed into
//! a flat list of drawing primitives, scaled onto an A4 page below an
//! optional title/composer header, and written out as PDF.
//!
//! # Example
//! ```no_run
//! use scorepdf::{transcode, DocumentOptions};
//!
//! let options = DocumentOptions::new()
//!     .with_title("Asa branca")
//!     .with_composer("Luiz Gonzaga");
//! let pdf = transcode("X:1\nT:Asa branca\nK:G\nGABc|d2d2|\n", &options).unwrap();
//! std::fs::write("asa-branca.pdf", &pdf.bytes).unwrap();
//! ```
//!
//! The renderer program is taken from `SCOREPDF_RENDERER` (arguments from
//! `SCOREPDF_RENDERER_ARGS`). It must read notation on stdin and write one
//! SVG document to stdout.

pub mod composer;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod page;
pub mod parser;
pub mod pdf;
pub mod renderer;
pub mod transcoder;
pub mod validate;

pub use config::{PageLayout, RendererConfig, TranscoderConfig};
pub use error::{ConversionError, ParseError, RenderError, Stage, ValidationError};
pub use model::*;
pub use parser::parse_vector_document;
pub use pdf::{PageEngine, PdfEngine};
pub use renderer::{CommandRenderer, NotationRenderer, RenderSession};
pub use transcoder::{Transcoder, VectorTranscoder};
pub use validate::validate_notation;

/// Transcode notation to PDF with the renderer configured in the environment.
pub fn transcode(
    notation: &str,
    options: &DocumentOptions,
) -> Result<TranscodeOutput, ConversionError> {
    let config = TranscoderConfig::from_env()?;
    // Validation comes first regardless of whether a renderer is available.
    validate_notation(notation)?;
    let renderer = CommandRenderer::from_config(&config.renderer).ok_or_else(|| {
        ConversionError::at(
            Stage::Render,
            format!("no notation renderer configured (set {})", config::RENDERER_ENV),
        )
    })?;
    Transcoder::new(renderer, config).transcode(notation, options)
}

/// Lay out an already-rendered SVG document on a PDF page.
pub fn vector_to_pdf(
    svg: &str,
    options: &DocumentOptions,
) -> Result<TranscodeOutput, ConversionError> {
    VectorTranscoder::default().transcode(svg, options)
}

/// Convert a parsed vector document to a JSON string.
/// Useful for passing data across FFI boundaries.
pub fn document_to_json(doc: &VectorDocument) -> Result<String, String> {
    serde_json::to_string_pretty(doc).map_err(|e| format!("JSON serialization error: {e}"))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for static and dynamic library consumers
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::CStr;
use std::os::raw::c_char;

/// Read an optional UTF-8 C string. Null and empty both mean "absent".
unsafe fn optional_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .ok()
        .filter(|s| !s.is_empty())
}

unsafe fn ffi_options(title: *const c_char, composer: *const c_char) -> DocumentOptions {
    let mut options = DocumentOptions::new();
    if let Some(title) = unsafe { optional_str(title) } {
        options = options.with_title(title);
    }
    if let Some(composer) = unsafe { optional_str(composer) } {
        options = options.with_composer(composer);
    }
    options
}

/// Hand PDF bytes to the caller, or null on failure.
unsafe fn into_raw_bytes(
    result: Result<TranscodeOutput, ConversionError>,
    out_len: *mut usize,
) -> *mut u8 {
    if !out_len.is_null() {
        unsafe { *out_len = 0 };
    }
    let Ok(output) = result else {
        return std::ptr::null_mut();
    };
    let bytes = output.bytes.into_boxed_slice();
    if !out_len.is_null() {
        unsafe { *out_len = bytes.len() };
    }
    Box::into_raw(bytes) as *mut u8
}

/// Transcode notation to PDF. The returned buffer holds `*out_len` bytes
/// and must be released with `scorepdf_free_bytes`.
///
/// `title` and `composer` may be null.
///
/// # Safety
/// `notation` must be a valid null-terminated UTF-8 C string; `title` and
/// `composer` must be null or valid C strings; `out_len` must be null or
/// point to writable memory.
#[no_mangle]
pub unsafe extern "C" fn scorepdf_transcode(
    notation: *const c_char,
    title: *const c_char,
    composer: *const c_char,
    out_len: *mut usize,
) -> *mut u8 {
    if notation.is_null() {
        return unsafe { into_raw_bytes(Err(ValidationError::Empty.into()), out_len) };
    }
    let result = match unsafe { CStr::from_ptr(notation) }.to_str() {
        Ok(notation) => transcode(notation, &unsafe { ffi_options(title, composer) }),
        Err(_) => Err(ConversionError::at(Stage::Validation, "notation is not valid UTF-8")),
    };
    unsafe { into_raw_bytes(result, out_len) }
}

/// Lay out an SVG document on a PDF page. Same ownership rules as
/// `scorepdf_transcode`.
///
/// # Safety
/// `svg` must be a valid null-terminated UTF-8 C string; `title` and
/// `composer` must be null or valid C strings; `out_len` must be null or
/// point to writable memory.
#[no_mangle]
pub unsafe extern "C" fn scorepdf_vector_to_pdf(
    svg: *const c_char,
    title: *const c_char,
    composer: *const c_char,
    out_len: *mut usize,
) -> *mut u8 {
    let Some(svg) = (unsafe { optional_str(svg) }) else {
        let missing = ConversionError::at(Stage::Parse, "no SVG input");
        return unsafe { into_raw_bytes(Err(missing), out_len) };
    };
    let result = vector_to_pdf(svg, &unsafe { ffi_options(title, composer) });
    unsafe { into_raw_bytes(result, out_len) }
}

/// Free a buffer previously returned by a scorepdf function.
///
/// # Safety
/// `ptr` must be null or a buffer returned by a scorepdf function, with the
/// `len` reported for it.
#[no_mangle]
pub unsafe extern "C" fn scorepdf_free_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() {
        unsafe {
            let _ = Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len));
        }
    }
}
