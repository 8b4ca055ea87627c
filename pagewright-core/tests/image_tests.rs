//! Image placement tests with PNG and JPEG sources synthesized in memory

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pagewright::compression::decompress;
use pagewright::{Document, DocumentConfig, ImageSource, ImageType, LinkTarget, PdfError, Unit};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::TempDir;

const COLOR_RGB: u8 = 2;
const COLOR_INDEXED: u8 = 3;
const COLOR_RGBA: u8 = 6;

fn chunk(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    // CRC is not checked by the reader
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

/// An 8-bit PNG whose rows use filter type 0.
fn png(
    width: u32,
    height: u32,
    color_type: u8,
    rows: &[Vec<u8>],
    extra: &[(&[u8; 4], Vec<u8>)],
) -> Vec<u8> {
    let mut ihdr = width.to_be_bytes().to_vec();
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);

    let mut raw = Vec::new();
    for row in rows {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let idat = encoder.finish().unwrap();

    let mut out = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    out.extend(chunk(b"IHDR", &ihdr));
    for (kind, payload) in extra {
        out.extend(chunk(kind, payload));
    }
    out.extend(chunk(b"IDAT", &idat));
    out.extend(chunk(b"IEND", &[]));
    out
}

fn jpeg(width: u16, height: u16, components: u8) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08];
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.push(components);
    data.extend_from_slice(&[0u8; 9]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

fn find(haystack: &[u8], needle: &str) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle.as_bytes())
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
    (dict, body[data_start..data_start + length].to_vec())
}

fn point_document() -> Document {
    let mut doc = Document::with_config(DocumentConfig {
        unit: Unit::Point,
        ..DocumentConfig::default()
    });
    doc.add_page().unwrap();
    doc
}

#[test]
fn test_alpha_png_gets_soft_mask() {
    let rows = vec![
        vec![255, 0, 0, 255, 0, 255, 0, 128],
        vec![0, 0, 255, 0, 10, 20, 30, 64],
    ];
    let data = png(2, 2, COLOR_RGBA, &rows, &[]);

    let mut doc = point_document();
    doc.image(
        &ImageSource::bytes(data, ImageType::Png),
        Some(10.0),
        Some(10.0),
        20.0,
        20.0,
        None,
    )
    .unwrap();
    let pdf = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&pdf).into_owned();

    assert!(pdf.starts_with(b"%PDF-1.4\n"));
    assert!(text.contains("/Group <<\n/Type /Group\n/S /Transparency\n/CS /DeviceRGB\n>>"));

    // page 3, content 4, image 5, soft mask 6
    let (image_dict, image_data) = stream_of(&pdf, 5);
    assert!(image_dict.contains("/ColorSpace /DeviceRGB"));
    assert!(image_dict.contains("/SMask 6 0 R"));
    assert!(!image_dict.contains("/DecodeParms"));
    assert_eq!(
        decompress(&image_data).unwrap(),
        vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30]
    );

    let (mask_dict, mask_data) = stream_of(&pdf, 6);
    assert!(mask_dict.contains("/Width 2\n/Height 2\n/ColorSpace /DeviceGray"));
    assert!(mask_dict.contains("/BitsPerComponent 8"));
    let alpha = decompress(&mask_data).unwrap();
    assert_eq!(alpha.len(), 2 * 2);
    assert_eq!(alpha, vec![255, 128, 0, 64]);

    assert!(text.contains("/XObject <<\n/I1 5 0 R\n>>"));
}

#[test]
fn test_indexed_png_writes_palette_stream() {
    let palette = vec![255, 0, 0, 0, 0, 255];
    let rows = vec![vec![0, 1, 1], vec![1, 0, 0]];
    let data = png(3, 2, COLOR_INDEXED, &rows, &[(b"PLTE", palette.clone())]);

    let mut doc = point_document();
    doc.image(
        &ImageSource::bytes(data, ImageType::Png),
        None,
        None,
        30.0,
        0.0,
        None,
    )
    .unwrap();
    let pdf = doc.to_bytes().unwrap();

    let (image_dict, _) = stream_of(&pdf, 5);
    assert!(image_dict.contains("/ColorSpace [/Indexed /DeviceRGB 1 6 0 R]"));
    assert!(image_dict.contains("/DecodeParms"));

    let (palette_dict, palette_data) = stream_of(&pdf, 6);
    assert!(palette_dict.contains("/Filter /FlateDecode"));
    assert_eq!(decompress(&palette_data).unwrap(), palette);
    // opaque images stay at 1.3
    assert!(pdf.starts_with(b"%PDF-1.3\n"));
}

#[test]
fn test_jpeg_passthrough_and_flow() {
    let data = jpeg(200, 100, 3);
    let mut doc = point_document();
    let y = doc.y();
    doc.image(
        &ImageSource::bytes(data.clone(), ImageType::Jpeg),
        None,
        None,
        100.0,
        0.0,
        None,
    )
    .unwrap();
    // height follows the aspect ratio and the cursor moves below the image
    assert!((doc.y() - (y + 50.0)).abs() < 1e-9);

    let pdf = doc.to_bytes().unwrap();
    let (dict, stream) = stream_of(&pdf, 5);
    assert!(dict.contains("/Filter /DCTDecode"));
    assert!(dict.contains("/Width 200\n/Height 100"));
    assert_eq!(stream, data);
}

#[test]
fn test_cmyk_jpeg_inverts_decode() {
    let mut doc = point_document();
    doc.image(
        &ImageSource::bytes(jpeg(10, 10, 4), ImageType::Jpeg),
        Some(0.0),
        Some(0.0),
        10.0,
        10.0,
        None,
    )
    .unwrap();
    let pdf = doc.to_bytes().unwrap();
    let (dict, _) = stream_of(&pdf, 5);
    assert!(dict.contains("/ColorSpace /DeviceCMYK"));
    assert!(dict.contains("/Decode [1 0 1 0 1 0 1 0]"));
}

#[test]
fn test_same_image_is_embedded_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pixel.png");
    std::fs::write(&path, png(1, 1, COLOR_RGB, &[vec![1, 2, 3]], &[])).unwrap();

    let mut doc = Document::with_config(DocumentConfig {
        compress: false,
        ..DocumentConfig::default()
    });
    doc.add_page().unwrap();
    let source = ImageSource::path(&path);
    doc.image(&source, Some(10.0), Some(10.0), 5.0, 5.0, None)
        .unwrap();
    doc.image(&source, Some(20.0), Some(10.0), 5.0, 5.0, None)
        .unwrap();
    doc.add_page().unwrap();
    doc.image(&source, Some(10.0), Some(10.0), 5.0, 5.0, None)
        .unwrap();

    let pdf = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert_eq!(text.matches("/Subtype /Image").count(), 1);
    assert_eq!(text.matches("/I1 Do Q").count(), 3);
}

#[test]
fn test_image_link() {
    let mut doc = point_document();
    doc.image(
        &ImageSource::bytes(jpeg(4, 4, 1), ImageType::Jpeg),
        Some(10.0),
        Some(20.0),
        40.0,
        40.0,
        Some(LinkTarget::Uri("https://example.com/logo".to_string())),
    )
    .unwrap();
    let text = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
    assert!(text.contains("/Rect [10.00 821.89 50.00 781.89]"));
    assert!(text.contains("/URI (https://example.com/logo)"));
}

#[test]
fn test_image_errors() {
    let mut doc = point_document();

    let result = doc.image(
        &ImageSource::bytes(b"not a png".to_vec(), ImageType::Png),
        None,
        None,
        10.0,
        10.0,
        None,
    );
    assert!(matches!(result, Err(PdfError::InvalidImage(_))));

    let result = doc.image(&ImageSource::path("logo.gif"), None, None, 10.0, 10.0, None);
    assert!(matches!(result, Err(PdfError::UnsupportedImage(_))));

    let palette_missing = png(1, 1, COLOR_INDEXED, &[vec![0]], &[]);
    let result = doc.image(
        &ImageSource::bytes(palette_missing, ImageType::Png),
        None,
        None,
        10.0,
        10.0,
        None,
    );
    assert!(matches!(result, Err(PdfError::InvalidImage(_))));
}
