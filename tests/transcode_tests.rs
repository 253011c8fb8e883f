//! Façade tests — the full pipeline driven by fake notation renderers.

use chrono::{DateTime, Local, TimeZone};
use pretty_assertions::assert_eq;
use scorepdf::{
    parse_vector_document, ConversionError, DocumentOptions, NotationRenderer, RenderError, Stage,
    Transcoder, TranscoderConfig, ValidationError, VectorTranscoder,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

fn output_dir() -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_output");
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
}

/// Returns a canned SVG for any notation and counts how often it was asked.
struct FixtureRenderer {
    svg: String,
    renders: Arc<AtomicUsize>,
}

impl FixtureRenderer {
    fn new(svg: String) -> Self {
        Self {
            svg,
            renders: Arc::default(),
        }
    }
}

impl NotationRenderer for FixtureRenderer {
    fn render(&self, _notation: &str) -> Result<String, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(self.svg.clone())
    }
}

struct FailingRenderer;

impl NotationRenderer for FailingRenderer {
    fn render(&self, _notation: &str) -> Result<String, RenderError> {
        Err(RenderError::Notation("line 2: unknown field 'Q'".into()))
    }
}

const TUNE: &str = "X:1\nT:Asa branca\nC:Luiz Gonzaga\nM:2/4\nL:1/8\nK:G\nGA|B2d2|d2B2|c2c2|\n";

fn transcoder(svg: &str) -> Transcoder<FixtureRenderer> {
    Transcoder::new(FixtureRenderer::new(svg.to_string()), TranscoderConfig::default())
}

#[test]
fn transcode_fixture_to_pdf() {
    let t = transcoder(&fixture("asa_branca.svg"));
    let options = DocumentOptions::new()
        .with_title("Asa branca")
        .with_composer("Luiz Gonzaga");
    let output = t.transcode(TUNE, &options).expect("transcode failed");

    assert!(output.bytes.starts_with(b"%PDF-"), "output should be a PDF");
    assert_eq!(output.size, output.bytes.len());
    assert!(output.size > 0);

    let out = output_dir().join("asa-branca.pdf");
    std::fs::write(&out, &output.bytes).expect("Failed to write PDF");
    println!("✓ Wrote asa-branca.pdf ({} bytes)", output.size);
    println!("  Output: {}", out.display());
}

#[test]
fn empty_notation_never_reaches_the_renderer() {
    let t = transcoder(&fixture("asa_branca.svg"));
    for notation in ["", "   ", "\n\t"] {
        let err = t.transcode(notation, &DocumentOptions::new()).unwrap_err();
        assert!(matches!(err, ConversionError::Validation(ValidationError::Empty)), "{err}");
        assert_eq!(err.to_string(), "Notation must be a non-empty string");
    }
}

#[test]
fn unsafe_notation_never_reaches_the_renderer() {
    let renderer = FixtureRenderer::new(fixture("asa_branca.svg"));
    let t = Transcoder::new(renderer, TranscoderConfig::default());
    let inputs = [
        "X:1\nT:<script>alert(1)</script>\nK:C\n",
        "X:1\nT:click\nW:javascript:void(0)\nK:C\n",
        "X:1\nT:<img onerror=boom>\nK:C\n",
    ];
    for notation in inputs {
        let err = t.transcode(notation, &DocumentOptions::new()).unwrap_err();
        assert_eq!(err.stage(), Stage::Validation);
        assert_eq!(err.to_string(), "Notation contains potentially unsafe content");
    }
}

#[test]
fn validation_failure_skips_rendering() {
    let renderer = FixtureRenderer::new(fixture("asa_branca.svg"));
    let renders = Arc::clone(&renderer.renders);
    let t = Transcoder::new(renderer, TranscoderConfig::default());

    t.transcode("   ", &DocumentOptions::new()).unwrap_err();
    t.transcode("<iframe src=x>", &DocumentOptions::new()).unwrap_err();
    assert_eq!(renders.load(Ordering::SeqCst), 0);

    t.transcode(TUNE, &DocumentOptions::new()).unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 1);
}

#[test]
fn renderer_failure_is_a_render_stage_error() {
    let t = Transcoder::new(FailingRenderer, TranscoderConfig::default());
    let err = t.transcode(TUNE, &DocumentOptions::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::Render);
    let message = err.to_string();
    assert!(message.contains("unknown field"), "{message}");
    assert!(!message.contains("Asa branca"), "notation leaked into: {message}");
}

#[test]
fn non_svg_renderer_output_is_a_parse_stage_error() {
    let t = transcoder("<html><body>oops</body></html>");
    let err = t.transcode(TUNE, &DocumentOptions::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::Parse);

    let t = transcoder("<svg><path d=");
    let err = t.transcode(TUNE, &DocumentOptions::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::Parse);
}

#[test]
fn malformed_path_is_a_page_engine_stage_error() {
    let t = transcoder(&fixture("broken_path.svg"));
    let err = t.transcode(TUNE, &DocumentOptions::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::PageEngine);
    assert!(err.to_string().starts_with("Conversion failed at page engine stage"), "{err}");
}

#[test]
fn fixed_timestamp_gives_identical_bytes() {
    let t = transcoder(&fixture("asa_branca.svg"));
    let options = DocumentOptions::new().with_title("Asa branca");
    let a = t.transcode_at(TUNE, &options, &fixed_time()).unwrap();
    let b = t.transcode_at(TUNE, &options, &fixed_time()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn transcode_vector_skips_validation_and_rendering() {
    let t = Transcoder::new(FailingRenderer, TranscoderConfig::default());
    let output = t
        .transcode_vector(&fixture("asa_branca.svg"), &DocumentOptions::new())
        .expect("vector transcode should not touch the renderer");
    assert!(output.bytes.starts_with(b"%PDF-"));
}

#[test]
fn missing_and_zero_dimensions_use_default_canvas() {
    let doc = parse_vector_document(&fixture("no_size.svg")).unwrap();
    assert_eq!((doc.canvas.width, doc.canvas.height), (600.0, 800.0));

    let zero = r#"<svg width="0" height="0"><path d="M0 0 L1 1"/></svg>"#;
    let doc = parse_vector_document(zero).unwrap();
    assert_eq!((doc.canvas.width, doc.canvas.height), (600.0, 800.0));

    let output = VectorTranscoder::default()
        .transcode_at(zero, &DocumentOptions::new(), &fixed_time())
        .unwrap();
    assert!(output.size > 0);
}

#[test]
fn vector_transcoder_honors_custom_layout() {
    let config = TranscoderConfig::from_json(
        r#"{ "layout": { "width": 612, "height": 792 }, "timestamp_format": "%d/%m/%Y" }"#,
    )
    .unwrap();
    let t = VectorTranscoder::new(config);
    assert_eq!(t.config().layout.width, 612.0);
    let output = t
        .transcode_at(&fixture("asa_branca.svg"), &DocumentOptions::new(), &fixed_time())
        .unwrap();
    assert!(output.bytes.starts_with(b"%PDF-"));
}
