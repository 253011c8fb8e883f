//! PDF output tests — re-open produced documents with lopdf and inspect them.

use chrono::{DateTime, Local, TimeZone};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};
use pretty_assertions::assert_eq;
use scorepdf::{parse_vector_document, DocumentOptions, VectorTranscoder};
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
}

fn render(svg: &str, options: &DocumentOptions) -> Document {
    let output = VectorTranscoder::default()
        .transcode_at(svg, options, &fixed_time())
        .expect("transcode failed");
    Document::load_mem(&output.bytes).expect("output should be a loadable PDF")
}

fn operations(doc: &Document) -> Vec<Operation> {
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1, "exactly one page");
    let page_id = *pages.values().next().unwrap();
    let data = doc.get_page_content(page_id).unwrap();
    Content::decode(&data).unwrap().operations
}

fn count(ops: &[Operation], names: &[&str]) -> usize {
    ops.iter().filter(|op| names.contains(&op.operator.as_str())).count()
}

fn numbers(op: &Operation) -> Vec<f64> {
    op.operands
        .iter()
        .map(|o| match o {
            Object::Integer(i) => *i as f64,
            Object::Real(r) => *r as f64,
            other => panic!("expected a number, got {other:?}"),
        })
        .collect()
}

fn shown_strings(ops: &[Operation]) -> Vec<Vec<u8>> {
    ops.iter()
        .filter(|op| op.operator == "Tj")
        .map(|op| match &op.operands[0] {
            Object::String(bytes, _) => bytes.clone(),
            other => panic!("expected a string, got {other:?}"),
        })
        .collect()
}

fn info_string(doc: &Document, key: &[u8]) -> Vec<u8> {
    let id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_object(id).unwrap().as_dict().unwrap();
    match info.get(key).unwrap() {
        Object::String(bytes, _) => bytes.clone(),
        other => panic!("expected a string, got {other:?}"),
    }
}

fn dict_at<'a>(
    doc: &'a Document,
    dict: &'a lopdf::Dictionary,
    key: &[u8],
) -> &'a lopdf::Dictionary {
    match dict.get(key).unwrap() {
        Object::Reference(id) => doc.get_object(*id).unwrap().as_dict().unwrap(),
        Object::Dictionary(inner) => inner,
        other => panic!("expected a dictionary, got {other:?}"),
    }
}

#[test]
fn page_is_a4() {
    let doc = render(&fixture("asa_branca.svg"), &DocumentOptions::new());
    let root = dict_at(&doc, &doc.trailer, b"Root");
    let pages = dict_at(&doc, root, b"Pages");
    let media_box: Vec<f64> = pages
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| match o {
            Object::Integer(i) => *i as f64,
            Object::Real(r) => *r as f64,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(media_box, vec![0.0, 0.0, 595.0, 842.0]);
}

#[test]
fn every_primitive_is_drawn_once() {
    let svg = fixture("asa_branca.svg");
    let parsed = parse_vector_document(&svg).unwrap();
    assert_eq!(parsed.path_count(), 5);
    assert_eq!(parsed.text_count(), 2);

    let options = DocumentOptions::new()
        .with_title("Asa branca")
        .with_composer("Luiz Gonzaga");
    let ops = operations(&render(&svg, &options));

    // One paint (or no-paint) operator per path.
    assert_eq!(count(&ops, &["f", "S", "B", "n"]), parsed.path_count());
    // Score texts plus title, composer and footer.
    assert_eq!(count(&ops, &["Tj"]), parsed.text_count() + 3);
    // Page flip and score transform are both balanced.
    assert_eq!(count(&ops, &["q"]), count(&ops, &["Q"]));
}

#[test]
fn header_and_footer_text() {
    let options = DocumentOptions::new()
        .with_title("Asa branca")
        .with_composer("Luiz Gonzaga");
    let ops = operations(&render(&fixture("asa_branca.svg"), &options));
    let shown = shown_strings(&ops);

    assert_eq!(shown[0], b"Asa branca".to_vec());
    assert_eq!(shown[1], b"Composer: Luiz Gonzaga".to_vec());
    assert_eq!(shown.last().unwrap(), &b"Generated on 2024-03-09 14:05:00".to_vec());
}

#[test]
fn composer_only_places_score_below_composer_line() {
    let options = DocumentOptions::new().with_composer("Luiz Gonzaga");
    let ops = operations(&render(&fixture("asa_branca.svg"), &options));

    let shown = shown_strings(&ops);
    assert_eq!(shown[0], b"Composer: Luiz Gonzaga".to_vec());

    // Second `cm` is the score placement; the first is the page flip.
    let placement = ops.iter().filter(|op| op.operator == "cm").nth(1).unwrap();
    let m = numbers(placement);
    assert!((m[0] - 0.825).abs() < 1e-4, "scale = {}", m[0]);
    assert!((m[4] - 50.0).abs() < 1e-3, "offset_x = {}", m[4]);
    assert!((m[5] - 83.6).abs() < 1e-3, "offset_y = {}", m[5]);
}

#[test]
fn invisible_path_is_not_painted() {
    let ops = operations(&render(&fixture("invisible.svg"), &DocumentOptions::new()));
    assert_eq!(count(&ops, &["n"]), 1);
    assert_eq!(count(&ops, &["f", "S", "B"]), 0);
    assert_eq!(count(&ops, &["rg", "RG"]), 0);
}

#[test]
fn document_info_defaults_and_metadata() {
    let doc = render(&fixture("asa_branca.svg"), &DocumentOptions::new());
    assert_eq!(info_string(&doc, b"Title"), b"Music Sheet".to_vec());
    assert_eq!(info_string(&doc, b"Author"), b"Unknown".to_vec());
    assert!(info_string(&doc, b"Creator").starts_with(b"scorepdf "));

    let options = DocumentOptions::new().with_title("童年").with_composer("罗大佑");
    let doc = render(&fixture("asa_branca.svg"), &options);
    let title = info_string(&doc, b"Title");
    assert_eq!(&title[..2], &[0xFE, 0xFF], "non-ASCII titles are UTF-16BE");
}

#[test]
fn only_used_fonts_are_referenced() {
    let doc = render(&fixture("invisible.svg"), &DocumentOptions::new());
    let page_id = *doc.get_pages().values().next().unwrap();
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = dict_at(&doc, page, b"Resources");
    let fonts = dict_at(&doc, resources, b"Font");

    // Just the footer, set in Helvetica.
    assert_eq!(fonts.len(), 1);
    let font = dict_at(&doc, fonts, b"F1");
    match font.get(b"BaseFont").unwrap() {
        Object::Name(name) => assert_eq!(name.as_slice(), b"Helvetica"),
        other => panic!("expected a name, got {other:?}"),
    }
}

#[test]
fn blank_header_values_draw_nothing() {
    let options = DocumentOptions::new().with_title("").with_composer("  ");
    let doc = render(&fixture("asa_branca.svg"), &options);
    let ops = operations(&doc);

    // Score texts plus the footer only.
    assert_eq!(count(&ops, &["Tj"]), 3);
    let placement = ops.iter().filter(|op| op.operator == "cm").nth(1).unwrap();
    assert!((numbers(placement)[5] - 50.0).abs() < 1e-3);
    assert_eq!(info_string(&doc, b"Title"), b"Music Sheet".to_vec());
    assert_eq!(info_string(&doc, b"Author"), b"Unknown".to_vec());
}
