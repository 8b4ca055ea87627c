//! End-to-end document generation tests
//!
//! Documents are built through the public API and the serialized bytes are
//! checked for structure: object framing, cross-reference offsets, page
//! tree, resources and annotations.

use pagewright::compression::decompress;
use pagewright::{
    CellAdvance, CellBorder, CellOptions, Document, DocumentConfig, PageLayout, PdfError,
    TextAlign, Unit, Zoom,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn uncompressed(unit: Unit) -> Document {
    Document::with_config(DocumentConfig {
        unit,
        compress: false,
        ..DocumentConfig::default()
    })
}

fn find(haystack: &[u8], needle: &str) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle.as_bytes())
}

/// Parse the cross-reference table into `(object number, offset)` pairs.
fn xref_entries(pdf: &[u8]) -> Vec<(usize, usize)> {
    let start = find(pdf, "\nxref\n").expect("xref table") + 1;
    let text = String::from_utf8_lossy(&pdf[start..]).into_owned();
    let mut lines = text.lines().skip(1);
    let header = lines.next().unwrap();
    let count: usize = header.split(' ').nth(1).unwrap().parse().unwrap();

    lines
        .take(count)
        .enumerate()
        .skip(1)
        .map(|(number, entry)| {
            assert!(entry.ends_with(" 00000 n "), "bad entry {entry:?}");
            (number, entry[..10].parse().unwrap())
        })
        .collect()
}

/// Dictionary text and raw stream bytes of object `number`.
fn stream_of(pdf: &[u8], number: usize) -> (String, Vec<u8>) {
    let start = find(pdf, &format!("\n{number} 0 obj\n")).expect("object") + 1;
    let body = &pdf[start..];
    let dict_end = find(body, "\nstream\n").expect("stream");
    let dict = String::from_utf8_lossy(&body[..dict_end]).into_owned();
    let length: usize = dict
        .split("/Length ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .expect("stream length");
    let data_start = dict_end + "\nstream\n".len();
    let data = body[data_start..data_start + length].to_vec();
    assert_eq!(&body[data_start + length..data_start + length + 10], b"\nendstream");
    (dict, data)
}

#[test]
fn test_hello_world() {
    let mut doc = Document::new();
    doc.add_page().unwrap();
    doc.set_font("Arial", "B", 16.0).unwrap();
    doc.cell(40.0, 10.0, "Hello World!", &CellOptions::default())
        .unwrap();
    let pdf = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&pdf);

    assert!(pdf.starts_with(b"%PDF-1.3\n"));
    assert!(pdf.ends_with(b"%%EOF\n"));
    assert_eq!(text.matches("/Type /Page\n").count(), 1);
    assert_eq!(text.matches("/Type /Font\n").count(), 1);
    assert!(text.contains("/BaseFont /Helvetica-Bold"));
    assert!(text.contains("/Font <<\n/F1 5 0 R\n>>"));
    // page, content, font, info, catalog and the two reserved objects
    assert!(text.contains("/Size 8\n"));

    let (dict, data) = stream_of(&pdf, 4);
    assert!(dict.contains("/Filter /FlateDecode"));
    let content = String::from_utf8(decompress(&data).unwrap()).unwrap();
    assert!(content.starts_with("2 J\n0.57 w\nBT /F1 16.00 Tf ET\n"));
    assert!(content.contains("(Hello World!) Tj ET"));
}

#[test]
fn test_xref_offsets_point_at_objects() {
    let mut doc = Document::new();
    doc.set_title("Offsets");
    for page in 1..=3 {
        doc.add_page().unwrap();
        doc.set_font("Times", "", 12.0).unwrap();
        doc.cell(0.0, 10.0, &format!("page {page}"), &CellOptions::default())
            .unwrap();
    }
    let pdf = doc.to_bytes().unwrap();

    let entries = xref_entries(&pdf);
    assert_eq!(entries.len(), 3 * 2 + 2 + 1 + 2);
    for (number, offset) in entries {
        let expected = format!("{number} 0 obj\n");
        assert_eq!(
            &pdf[offset..offset + expected.len()],
            expected.as_bytes(),
            "object {number}"
        );
    }

    let startxref = find(&pdf, "startxref\n").unwrap() + "startxref\n".len();
    let offset: usize = String::from_utf8_lossy(&pdf[startxref..])
        .lines()
        .next()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(&pdf[offset..offset + 5], b"xref\n");
}

#[test]
fn test_table_frames_every_cell() {
    let mut doc = uncompressed(Unit::Millimeter);
    doc.add_page().unwrap();
    doc.set_font("Courier", "", 10.0).unwrap();
    let frame = CellOptions::new().border(CellBorder::Frame);
    let rows = [["a", "b", "c"], ["d", "e", "f"], ["g", "h", "i"]];
    for row in rows {
        for value in row {
            doc.cell(30.0, 6.0, value, &frame).unwrap();
        }
        doc.ln(None);
    }
    let content = String::from_utf8_lossy(doc.page_content(1).unwrap()).into_owned();
    assert_eq!(content.matches(" re S ").count(), 9);
    assert_eq!(content.matches(") Tj ET").count(), 9);
    assert!((doc.y() - (doc.top_margin() + 18.0)).abs() < 1e-9);
}

#[test]
fn test_automatic_page_break() {
    let mut doc = uncompressed(Unit::Millimeter);
    doc.add_page().unwrap();
    doc.set_font("Times", "", 12.0).unwrap();
    let line = CellOptions::new().advance(CellAdvance::NextLine);
    for i in 0..60 {
        doc.cell(0.0, 10.0, &format!("line {i}"), &line).unwrap();
    }
    assert!(doc.page_no() >= 3);

    // the font is replayed on every new page
    for page in 2..=doc.page_no() {
        let content = String::from_utf8_lossy(doc.page_content(page).unwrap()).into_owned();
        assert!(content.starts_with("2 J\n0.57 w\nBT /F1 12.00 Tf ET\n"));
    }
}

#[test]
fn test_justified_single_space_line_has_zero_spacing() {
    let mut doc = uncompressed(Unit::Point);
    doc.add_page().unwrap();
    doc.set_font("Courier", "", 10.0).unwrap();
    doc.set_cell_margin(0.0);
    // ten Courier characters fit in 60 pt
    doc.multi_cell(
        60.0,
        12.0,
        "aaaa bbbbbbbbb",
        CellBorder::None,
        TextAlign::Justified,
        false,
    )
    .unwrap();

    let content = String::from_utf8_lossy(doc.page_content(1).unwrap()).into_owned();
    assert!(content.contains("0.000 Tw"));
    assert!(content.contains("(aaaa) Tj"));
    assert!(content.contains("(bbbbbbbbb) Tj"));
}

#[test]
fn test_justified_line_fills_width() {
    let mut doc = uncompressed(Unit::Point);
    doc.add_page().unwrap();
    doc.set_font("Courier", "", 10.0).unwrap();
    doc.set_cell_margin(0.0);
    // "aa bb cc" is 8 of 10 available characters: 12 pt over two gaps
    doc.multi_cell(
        60.0,
        12.0,
        "aa bb cc dddd",
        CellBorder::None,
        TextAlign::Justified,
        false,
    )
    .unwrap();

    let content = String::from_utf8_lossy(doc.page_content(1).unwrap()).into_owned();
    assert!(content.contains("6.000 Tw\n"));
    assert!(content.contains("(aa bb cc) Tj"));
    // spacing is cleared before the last line
    let last = content.find("(dddd) Tj").unwrap();
    assert!(content[..last].rfind("\n0 Tw\n").unwrap() > content.find("6.000 Tw").unwrap());
}

#[test]
fn test_alias_page_count() {
    let mut doc = uncompressed(Unit::Millimeter);
    doc.alias_page_count("{nb}");
    doc.set_font("Helvetica", "", 10.0).unwrap();
    for _ in 0..4 {
        doc.add_page().unwrap();
        let label = format!("Page {}/{{nb}}", doc.page_no());
        doc.cell(0.0, 10.0, &label, &CellOptions::default()).unwrap();
    }
    let pdf = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&pdf);
    for page in 1..=4 {
        assert!(text.contains(&format!("(Page {page}/4) Tj")));
    }
    assert!(!text.contains("{nb}"));
}

#[test]
fn test_internal_and_external_links() {
    let mut doc = uncompressed(Unit::Point);
    doc.add_page().unwrap();
    doc.set_font("Helvetica", "", 12.0).unwrap();
    let appendix = doc.add_link();
    doc.cell(
        100.0,
        20.0,
        "see appendix",
        &CellOptions::new().link(appendix),
    )
    .unwrap();
    doc.write(14.0, "visit example.org", Some("https://example.org".into()))
        .unwrap();

    doc.add_page().unwrap();
    doc.add_page().unwrap();
    doc.set_link(appendix, Some(50.0), None).unwrap();

    let pdf = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert_eq!(text.matches("/Subtype /Link").count(), 2);
    // third page is object 7
    assert!(text.contains("/Dest [7 0 R /XYZ 0 791.89 null]"));
    assert!(text.contains("/URI (https://example.org)"));
    assert!(text.contains("/Annots ["));
}

#[test]
fn test_unresolved_link_is_an_error() {
    let mut doc = Document::new();
    doc.add_page().unwrap();
    doc.set_font("Helvetica", "", 12.0).unwrap();
    let nowhere = doc.add_link();
    doc.cell(10.0, 10.0, "x", &CellOptions::new().link(nowhere))
        .unwrap();
    assert!(matches!(doc.to_bytes(), Err(PdfError::InvalidLink(_))));
}

#[test]
fn test_display_mode() {
    let mut doc = uncompressed(Unit::Millimeter);
    doc.set_display_mode(Zoom::FullPage, PageLayout::Single);
    let text = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
    assert!(text.contains("/OpenAction [3 0 R /Fit]"));
    assert!(text.contains("/PageLayout /SinglePage"));

    let mut doc = uncompressed(Unit::Millimeter);
    doc.set_display_mode(Zoom::Real, PageLayout::Default);
    let text = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
    assert!(text.contains("/OpenAction [3 0 R /XYZ null null 1]"));
    assert!(!text.contains("/PageLayout"));
}

#[test]
fn test_operations_after_close_fail() {
    let mut doc = Document::new();
    doc.add_page().unwrap();
    doc.set_font("Helvetica", "", 12.0).unwrap();
    doc.close().unwrap();
    assert!(matches!(doc.add_page(), Err(PdfError::InvalidState(_))));
    assert!(doc
        .cell(10.0, 10.0, "late", &CellOptions::default())
        .is_err());
    // closing twice is harmless
    doc.close().unwrap();
}

#[test]
fn test_save_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("saved.pdf");

    let mut doc = Document::new();
    doc.set_author("Tester");
    doc.add_page().unwrap();
    doc.set_font("Courier", "", 10.0).unwrap();
    doc.multi_cell(
        0.0,
        5.0,
        "Line one\nLine two\nLine three",
        CellBorder::Frame,
        TextAlign::Left,
        false,
    )
    .unwrap();
    doc.save(&path).unwrap();

    let saved = std::fs::read(&path).unwrap();
    assert_eq!(saved, doc.to_bytes().unwrap());
    assert!(String::from_utf8_lossy(&saved).contains("/Author (Tester)"));
}

#[test]
fn test_landscape_page_in_portrait_document() {
    let mut doc = uncompressed(Unit::Point);
    doc.add_page().unwrap();
    doc.add_page_with(Some(pagewright::Orientation::Landscape), None)
        .unwrap();
    assert!((doc.page_width() - 841.89).abs() < 1e-9);
    doc.add_page().unwrap();
    // a plain new page goes back to the default orientation
    assert!((doc.page_width() - 595.28).abs() < 1e-9);

    let text = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
    assert_eq!(text.matches("/MediaBox [0 0 841.89 595.28]").count(), 1);
    // only the page tree carries the default size
    assert_eq!(text.matches("/MediaBox [0 0 595.28 841.89]").count(), 1);
}
