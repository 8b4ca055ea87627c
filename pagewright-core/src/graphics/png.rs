//! PNG ingestion.
//!
//! Walks the chunk stream (IHDR, PLTE, tRNS, IDAT, IEND) and produces an
//! [`ImageResource`]. Opaque images keep their zlib IDAT data untouched and
//! declare a PNG predictor so the viewer undoes the scanline filters. Images
//! with an alpha channel are inflated, unfiltered and split into a color
//! payload plus an 8-bit gray soft mask, both deflated again.

use crate::compression;
use crate::error::{PdfError, Result};
use crate::graphics::image::{ImageColorSpace, ImageFilter, ImageResource, PredictorParams};
use tracing::debug;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const COLOR_GRAYSCALE: u8 = 0;
const COLOR_RGB: u8 = 2;
const COLOR_INDEXED: u8 = 3;
const COLOR_GRAYSCALE_ALPHA: u8 = 4;
const COLOR_RGBA: u8 = 6;

#[derive(Debug, Clone, Copy)]
struct Ihdr {
    width: u32,
    height: u32,
    bit_depth: u8,
    color_type: u8,
}

fn parse_ihdr(data: &[u8]) -> Result<Ihdr> {
    if data.len() < 13 {
        return Err(PdfError::InvalidImage("Truncated PNG header".to_string()));
    }
    let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let bit_depth = data[8];
    let color_type = data[9];

    if width == 0 || height == 0 {
        return Err(PdfError::InvalidImage("PNG has a zero dimension".to_string()));
    }
    if bit_depth > 8 {
        return Err(PdfError::UnsupportedImage(format!(
            "{bit_depth}-bit PNG depth not supported"
        )));
    }
    if !matches!(
        color_type,
        COLOR_GRAYSCALE | COLOR_RGB | COLOR_INDEXED | COLOR_GRAYSCALE_ALPHA | COLOR_RGBA
    ) {
        return Err(PdfError::InvalidImage(format!(
            "Unknown PNG color type: {color_type}"
        )));
    }
    if data[10] != 0 {
        return Err(PdfError::InvalidImage("Unknown PNG compression method".to_string()));
    }
    if data[11] != 0 {
        return Err(PdfError::InvalidImage("Unknown PNG filter method".to_string()));
    }
    if data[12] != 0 {
        return Err(PdfError::UnsupportedImage("Interlaced PNG not supported".to_string()));
    }

    Ok(Ihdr {
        width,
        height,
        bit_depth,
        color_type,
    })
}

struct Chunk<'a> {
    chunk_type: [u8; 4],
    data: &'a [u8],
}

/// Iterates `(length, type, payload, crc)` records after the signature. The
/// CRC is skipped, not verified.
struct ChunkIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkIter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: PNG_SIGNATURE.len(),
        }
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        if self.pos + 8 > self.data.len() {
            return Some(Err(truncated()));
        }

        let d = self.data;
        let p = self.pos;
        let length = u32::from_be_bytes([d[p], d[p + 1], d[p + 2], d[p + 3]]) as usize;
        let chunk_type = [d[p + 4], d[p + 5], d[p + 6], d[p + 7]];

        let data_start = p + 8;
        let data_end = match data_start.checked_add(length) {
            Some(end) => end,
            None => return Some(Err(truncated())),
        };
        let crc_end = data_end + 4;
        if crc_end > d.len() {
            return Some(Err(truncated()));
        }

        self.pos = crc_end;
        Some(Ok(Chunk {
            chunk_type,
            data: &d[data_start..data_end],
        }))
    }
}

fn truncated() -> PdfError {
    PdfError::InvalidImage("Truncated PNG chunk".to_string())
}

/// Decode a PNG byte stream into an image resource.
pub fn parse_png(data: &[u8]) -> Result<ImageResource> {
    if data.len() < PNG_SIGNATURE.len() || data[..8] != PNG_SIGNATURE {
        return Err(PdfError::InvalidImage("Not a PNG file".to_string()));
    }

    let mut chunks = ChunkIter::new(data);
    let header = match chunks.next() {
        Some(chunk) => {
            let chunk = chunk?;
            if &chunk.chunk_type != b"IHDR" {
                return Err(PdfError::InvalidImage("Incorrect PNG file: missing IHDR".to_string()));
            }
            parse_ihdr(chunk.data)?
        }
        None => return Err(PdfError::InvalidImage("Incorrect PNG file: missing IHDR".to_string())),
    };

    let color_space = match header.color_type {
        COLOR_GRAYSCALE | COLOR_GRAYSCALE_ALPHA => ImageColorSpace::DeviceGray,
        COLOR_RGB | COLOR_RGBA => ImageColorSpace::DeviceRGB,
        _ => ImageColorSpace::Indexed,
    };

    let mut palette = Vec::new();
    let mut transparency = Vec::new();
    let mut idat = Vec::new();

    for chunk in chunks {
        let chunk = chunk?;
        match &chunk.chunk_type {
            b"PLTE" => palette = chunk.data.to_vec(),
            b"tRNS" => transparency = color_key(header.color_type, chunk.data),
            b"IDAT" => idat.extend_from_slice(chunk.data),
            b"IEND" => break,
            _ => {}
        }
    }

    if color_space == ImageColorSpace::Indexed && palette.is_empty() {
        return Err(PdfError::InvalidImage("Missing palette in indexed PNG".to_string()));
    }

    let mut image = ImageResource {
        width: header.width,
        height: header.height,
        color_space,
        bits_per_component: header.bit_depth,
        filter: ImageFilter::FlateDecode,
        predictor: None,
        data: Vec::new(),
        palette,
        transparency,
        soft_mask: None,
    };

    if matches!(header.color_type, COLOR_GRAYSCALE_ALPHA | COLOR_RGBA) {
        if header.bit_depth != 8 {
            return Err(PdfError::UnsupportedImage(format!(
                "{}-bit alpha PNG not supported",
                header.bit_depth
            )));
        }
        let channels = if header.color_type == COLOR_RGBA { 4 } else { 2 };
        let raw = compression::decompress(&idat)?;
        let pixels = unfilter(&raw, header.width, header.height, channels)?;
        let (color, alpha) = split_alpha(&pixels, channels);

        image.data = compression::compress(&color)?;
        image.soft_mask = Some(Box::new(ImageResource::soft_mask_of(
            header.width,
            header.height,
            compression::compress(&alpha)?,
        )));
        debug!(
            width = header.width,
            height = header.height,
            "split PNG alpha channel into soft mask"
        );
    } else {
        image.predictor = Some(PredictorParams {
            colors: if color_space == ImageColorSpace::DeviceRGB { 3 } else { 1 },
            bits_per_component: header.bit_depth,
            columns: header.width,
        });
        image.data = idat;
    }

    Ok(image)
}

/// Color-key values from a tRNS chunk: the low byte of each 16-bit sample for
/// gray/RGB, or the first fully transparent palette index.
fn color_key(color_type: u8, data: &[u8]) -> Vec<u8> {
    match color_type {
        COLOR_GRAYSCALE if data.len() >= 2 => vec![data[1]],
        COLOR_RGB if data.len() >= 6 => vec![data[1], data[3], data[5]],
        COLOR_INDEXED => data
            .iter()
            .position(|&alpha| alpha == 0)
            .map(|index| vec![index as u8])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Paeth predictor function.
fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (a, b, c) = (a as i32, b as i32, c as i32);
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

/// Undo PNG scanline filters.
///
/// `raw` holds a filter-type byte followed by `width * bpp` bytes per row; the
/// result is the bare pixel rows.
fn unfilter(raw: &[u8], width: u32, height: u32, bpp: usize) -> Result<Vec<u8>> {
    let truncated = || PdfError::InvalidImage("PNG image data is truncated".to_string());
    let stride = (width as usize).checked_mul(bpp).ok_or_else(truncated)?;
    let row_len = stride.checked_add(1).ok_or_else(truncated)?;
    let expected = row_len
        .checked_mul(height as usize)
        .ok_or_else(truncated)?;
    let size = stride.checked_mul(height as usize).ok_or_else(truncated)?;

    if raw.len() < expected {
        return Err(truncated());
    }

    let mut out = vec![0u8; size];

    for y in 0..height as usize {
        let filter_byte = raw[y * row_len];
        let row_data = &raw[y * row_len + 1..y * row_len + 1 + stride];
        let out_row_start = y * stride;

        for x in 0..stride {
            let raw_byte = row_data[x];

            let a = if x >= bpp { out[out_row_start + x - bpp] } else { 0 };
            let b = if y > 0 { out[out_row_start - stride + x] } else { 0 };
            let c = if y > 0 && x >= bpp {
                out[out_row_start - stride + x - bpp]
            } else {
                0
            };

            out[out_row_start + x] = match filter_byte {
                0 => raw_byte,
                1 => raw_byte.wrapping_add(a),
                2 => raw_byte.wrapping_add(b),
                3 => raw_byte.wrapping_add(((a as u16 + b as u16) / 2) as u8),
                4 => raw_byte.wrapping_add(paeth(a, b, c)),
                other => {
                    return Err(PdfError::InvalidImage(format!(
                        "Unknown PNG filter type: {other}"
                    )))
                }
            };
        }
    }

    Ok(out)
}

/// De-interleave pixels whose last channel is alpha.
fn split_alpha(pixels: &[u8], channels: usize) -> (Vec<u8>, Vec<u8>) {
    let count = pixels.len() / channels;
    let mut color = Vec::with_capacity(count * (channels - 1));
    let mut alpha = Vec::with_capacity(count);
    for pixel in pixels.chunks_exact(channels) {
        color.extend_from_slice(&pixel[..channels - 1]);
        alpha.push(pixel[channels - 1]);
    }
    (color, alpha)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn chunk(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = (payload.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    /// Build a PNG from unfiltered rows, prefixing each with filter type 0.
    pub(crate) fn build_png(
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

        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(chunk(b"IHDR", &ihdr));
        for (kind, payload) in extra {
            png.extend(chunk(kind, payload));
        }
        png.extend(chunk(b"IDAT", &compression::compress(&raw).unwrap()));
        png.extend(chunk(b"IEND", &[]));
        png
    }

    #[test]
    fn test_rejects_bad_signature() {
        let result = parse_png(b"GIF89a..........");
        assert!(matches!(result, Err(PdfError::InvalidImage(_))));
    }

    #[test]
    fn test_opaque_rgb_keeps_idat_and_predictor() {
        let rows = vec![vec![255, 0, 0, 0, 255, 0], vec![0, 0, 255, 255, 255, 255]];
        let png = build_png(2, 2, COLOR_RGB, &rows, &[]);
        let image = parse_png(&png).unwrap();

        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 2);
        assert_eq!(image.color_space(), ImageColorSpace::DeviceRGB);
        assert_eq!(
            image.predictor(),
            Some(PredictorParams {
                colors: 3,
                bits_per_component: 8,
                columns: 2
            })
        );
        assert!(image.soft_mask().is_none());
        // payload is the IDAT stream, filter bytes included
        let inflated = compression::decompress(image.data()).unwrap();
        assert_eq!(inflated.len(), 2 * (1 + 6));
    }

    #[test]
    fn test_gray_alpha_split_into_soft_mask() {
        let rows = vec![vec![10, 200, 20, 100, 30, 0], vec![40, 255, 50, 1, 60, 2]];
        let png = build_png(3, 2, COLOR_GRAYSCALE_ALPHA, &rows, &[]);
        let image = parse_png(&png).unwrap();

        assert_eq!(image.color_space(), ImageColorSpace::DeviceGray);
        assert!(image.predictor().is_none());
        assert_eq!(
            compression::decompress(image.data()).unwrap(),
            vec![10, 20, 30, 40, 50, 60]
        );

        let mask = image.soft_mask().unwrap();
        assert_eq!(mask.bits_per_component(), 8);
        assert_eq!(mask.color_space(), ImageColorSpace::DeviceGray);
        let alpha = compression::decompress(mask.data()).unwrap();
        assert_eq!(alpha, vec![200, 100, 0, 255, 1, 2]);
    }

    #[test]
    fn test_rgba_soft_mask_is_width_times_height() {
        let width = 5u32;
        let height = 4u32;
        let rows: Vec<Vec<u8>> = (0..height)
            .map(|y| {
                (0..width)
                    .flat_map(|x| [x as u8, y as u8, 7, (x * y) as u8])
                    .collect()
            })
            .collect();
        let png = build_png(width, height, COLOR_RGBA, &rows, &[]);
        let image = parse_png(&png).unwrap();

        let mask = image.soft_mask().unwrap();
        let alpha = compression::decompress(mask.data()).unwrap();
        assert_eq!(alpha.len(), (width * height) as usize);
        let color = compression::decompress(image.data()).unwrap();
        assert_eq!(color.len(), (width * height * 3) as usize);
    }

    #[test]
    fn test_oversized_alpha_header_is_rejected() {
        let png = build_png(u32::MAX, u32::MAX, COLOR_RGBA, &[vec![0; 4]], &[]);
        match parse_png(&png) {
            Err(PdfError::InvalidImage(msg)) => assert!(msg.contains("truncated")),
            other => panic!("expected InvalidImage, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_indexed_requires_palette() {
        let rows = vec![vec![0, 1]];
        let png = build_png(2, 1, COLOR_INDEXED, &rows, &[]);
        assert!(matches!(parse_png(&png), Err(PdfError::InvalidImage(_))));

        let png = build_png(
            2,
            1,
            COLOR_INDEXED,
            &rows,
            &[
                (b"PLTE", vec![0, 0, 0, 255, 255, 255]),
                (b"tRNS", vec![255, 0]),
            ],
        );
        let image = parse_png(&png).unwrap();
        assert_eq!(image.color_space(), ImageColorSpace::Indexed);
        assert_eq!(image.palette().len(), 6);
        assert_eq!(image.transparency(), &[1]);
    }

    #[test]
    fn test_rgb_color_key() {
        let rows = vec![vec![1, 2, 3]];
        let png = build_png(1, 1, COLOR_RGB, &rows, &[(b"tRNS", vec![0, 1, 0, 2, 0, 3])]);
        let image = parse_png(&png).unwrap();
        assert_eq!(image.transparency(), &[1, 2, 3]);
    }

    #[test]
    fn test_rejects_unsupported_headers() {
        let mut png = build_png(1, 1, COLOR_RGB, &[vec![0, 0, 0]], &[]);
        // bit depth lives at offset 8 (signature) + 8 (chunk header) + 8
        png[24] = 16;
        assert!(matches!(parse_png(&png), Err(PdfError::UnsupportedImage(_))));

        let mut png = build_png(1, 1, COLOR_RGB, &[vec![0, 0, 0]], &[]);
        png[28] = 1; // interlace method
        assert!(matches!(parse_png(&png), Err(PdfError::UnsupportedImage(_))));

        let mut png = build_png(1, 1, COLOR_RGB, &[vec![0, 0, 0]], &[]);
        png[25] = 5; // color type
        assert!(matches!(parse_png(&png), Err(PdfError::InvalidImage(_))));
    }

    #[test]
    fn test_unknown_chunks_are_skipped() {
        let rows = vec![vec![9]];
        let png = build_png(1, 1, COLOR_GRAYSCALE, &rows, &[(b"tEXt", b"Comment\0hi".to_vec())]);
        let image = parse_png(&png).unwrap();
        assert_eq!(image.color_space(), ImageColorSpace::DeviceGray);
    }

    #[test]
    fn test_unfilter_sub_up_average_paeth() {
        // 2x2, one byte per pixel
        let raw = vec![
            1, 10, 5, // Sub: 10, 15
            2, 1, 1, // Up: 11, 16
        ];
        assert_eq!(unfilter(&raw, 2, 2, 1).unwrap(), vec![10, 15, 11, 16]);

        let raw = vec![0, 10, 20, 3, 5, 5];
        // Average row 2: x0 = 5 + (0+10)/2 = 10, x1 = 5 + (10+20)/2 = 20
        assert_eq!(unfilter(&raw, 2, 2, 1).unwrap(), vec![10, 20, 10, 20]);

        let raw = vec![0, 10, 20, 4, 0, 0];
        assert_eq!(unfilter(&raw, 2, 2, 1).unwrap(), vec![10, 20, 10, 20]);

        assert!(unfilter(&[7, 0], 1, 1, 1).is_err());
    }

    #[test]
    fn test_paeth() {
        assert_eq!(paeth(10, 20, 10), 20);
        assert_eq!(paeth(20, 10, 10), 20);
        assert_eq!(paeth(0, 0, 0), 0);
    }
}
