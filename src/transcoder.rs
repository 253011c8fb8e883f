//! Transcoder façade — notation in, finished PDF out.
//!
//! ```text
//! notation
//!  │
//!  ├─ 1. Validate   reject empty / unsafe input
//!  ├─ 2. Render     external renderer → SVG (exclusive render session)
//!  ├─ 3. Parse      SVG → VectorDocument
//!  ├─ 4. Normalize  scale-to-fit, centering
//!  ├─ 5. Compose    header, scaled score, footer → PageDocument
//!  └─ 6. Finalize   page engine → PDF bytes
//! ```
//!
//! Either a complete document comes back or a [`ConversionError`] naming
//! the stage that failed. Nothing is retried.

use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::composer::PageComposer;
use crate::config::TranscoderConfig;
use crate::error::{ConversionError, Stage};
use crate::geometry::normalize;
use crate::model::{DocumentOptions, TranscodeOutput};
use crate::parser::parse_vector_document;
use crate::pdf::{PageEngine, PdfEngine};
use crate::renderer::{NotationRenderer, RenderSession};
use crate::validate::validate_notation;

/// Vector document → page, for callers that already have renderer output.
pub struct VectorTranscoder<E = PdfEngine> {
    config: TranscoderConfig,
    engine: E,
}

impl VectorTranscoder<PdfEngine> {
    pub fn new(config: TranscoderConfig) -> Self {
        Self::with_engine(config, PdfEngine)
    }
}

impl Default for VectorTranscoder<PdfEngine> {
    fn default() -> Self {
        Self::new(TranscoderConfig::default())
    }
}

impl<E: PageEngine> VectorTranscoder<E> {
    pub fn with_engine(config: TranscoderConfig, engine: E) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    pub fn transcode(
        &self,
        svg: &str,
        options: &DocumentOptions,
    ) -> Result<TranscodeOutput, ConversionError> {
        self.transcode_at(svg, options, &Local::now())
    }

    /// Like [`transcode`](Self::transcode) with a fixed footer timestamp.
    /// Identical inputs produce byte-identical output.
    pub fn transcode_at(
        &self,
        svg: &str,
        options: &DocumentOptions,
        generated_at: &DateTime<Local>,
    ) -> Result<TranscodeOutput, ConversionError> {
        let doc = parse_vector_document(svg)?;

        let layout = &self.config.layout;
        let geometry = normalize(&doc.canvas, layout.drawable_area(), layout.margin, 0.0);
        debug!(scale = geometry.scale, offset_x = geometry.offset_x, "normalized canvas");

        let page = PageComposer::new(layout, &self.config.timestamp_format).compose(
            &doc,
            geometry,
            options,
            generated_at,
        );
        debug!(instructions = page.instructions.len(), draws = page.draw_count(), "composed page");

        let bytes = self
            .engine
            .render_page(&page)
            .map_err(|e| ConversionError::at(Stage::PageEngine, e))?;
        Ok(TranscodeOutput::new(bytes))
    }
}

/// The full pipeline, from notation text.
pub struct Transcoder<R, E = PdfEngine> {
    renderer: R,
    vector: VectorTranscoder<E>,
}

impl<R: NotationRenderer> Transcoder<R, PdfEngine> {
    pub fn new(renderer: R, config: TranscoderConfig) -> Self {
        Self::with_engine(renderer, config, PdfEngine)
    }
}

impl<R: NotationRenderer, E: PageEngine> Transcoder<R, E> {
    pub fn with_engine(renderer: R, config: TranscoderConfig, engine: E) -> Self {
        Self {
            renderer,
            vector: VectorTranscoder::with_engine(config, engine),
        }
    }

    pub fn config(&self) -> &TranscoderConfig {
        self.vector.config()
    }

    pub fn transcode(
        &self,
        notation: &str,
        options: &DocumentOptions,
    ) -> Result<TranscodeOutput, ConversionError> {
        self.transcode_at(notation, options, &Local::now())
    }

    /// Like [`transcode`](Self::transcode) with a fixed footer timestamp.
    pub fn transcode_at(
        &self,
        notation: &str,
        options: &DocumentOptions,
        generated_at: &DateTime<Local>,
    ) -> Result<TranscodeOutput, ConversionError> {
        let started = Instant::now();
        info!(input_bytes = notation.len(), "starting transcode");

        validate_notation(notation)?;

        let svg = {
            let session = RenderSession::acquire(&self.renderer)
                .map_err(|e| ConversionError::at(Stage::Render, e))?;
            session
                .render(notation)
                .map_err(|e| ConversionError::at(Stage::Render, e))?
        };
        debug!(svg_bytes = svg.len(), "rendered notation");

        let output = self.vector.transcode_at(&svg, options, generated_at)?;
        info!(
            output_bytes = output.size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transcode finished"
        );
        Ok(output)
    }

    /// Skip validation and rendering: transcode an SVG document directly.
    pub fn transcode_vector(
        &self,
        svg: &str,
        options: &DocumentOptions,
    ) -> Result<TranscodeOutput, ConversionError> {
        self.vector.transcode(svg, options)
    }
}
