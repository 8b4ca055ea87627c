//! JPEG ingestion.
//!
//! JPEG data is embedded as-is under `/DCTDecode`; all the engine needs is
//! the frame size and color space. That information comes from a
//! [`JpegDecoder`], which callers may replace.

use crate::error::{PdfError, Result};
use crate::graphics::image::{ImageColorSpace, ImageResource};

/// Frame information reported by a JPEG decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegInfo {
    pub width: u32,
    pub height: u32,
    pub color_space: ImageColorSpace,
    pub bits_per_component: u8,
}

/// Reads frame information from JPEG bytes without re-encoding them.
pub trait JpegDecoder {
    fn decode(&self, data: &[u8]) -> Result<JpegInfo>;
}

/// Build an image resource that passes the JPEG bytes through unchanged.
pub fn load_jpeg(decoder: &dyn JpegDecoder, data: Vec<u8>) -> Result<ImageResource> {
    let info = decoder.decode(&data)?;
    if info.width == 0 || info.height == 0 {
        return Err(PdfError::InvalidImage("JPEG has a zero dimension".to_string()));
    }
    Ok(ImageResource::jpeg(
        info.width,
        info.height,
        info.color_space,
        info.bits_per_component,
        data,
    ))
}

/// The decoder used when none is configured.
pub fn default_decoder() -> Box<dyn JpegDecoder> {
    #[cfg(feature = "external-images")]
    {
        Box::new(ImageCrateDecoder)
    }
    #[cfg(not(feature = "external-images"))]
    {
        Box::new(MarkerScanDecoder)
    }
}

/// Scans JPEG markers up to the first start-of-frame segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerScanDecoder;

impl JpegDecoder for MarkerScanDecoder {
    fn decode(&self, data: &[u8]) -> Result<JpegInfo> {
        parse_jpeg_header(data)
    }
}

fn parse_jpeg_header(data: &[u8]) -> Result<JpegInfo> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(PdfError::InvalidImage("Not a valid JPEG file".to_string()));
    }

    let mut pos = 2;
    let mut frame = None;

    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return Err(PdfError::InvalidImage("Invalid JPEG marker".to_string()));
        }

        let marker = data[pos + 1];
        pos += 2;

        // Fill bytes
        if marker == 0xFF {
            pos -= 1;
            continue;
        }

        // SOF0-SOF15, minus DHT (C4), JPG (C8) and DAC (CC)
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC
        {
            if pos + 7 >= data.len() {
                return Err(PdfError::InvalidImage("Truncated JPEG file".to_string()));
            }
            let precision = data[pos + 2];
            let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
            let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            let components = data[pos + 7];
            frame = Some((width, height, components, precision));
            break;
        } else if marker == 0xD9 {
            break;
        } else if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            // standalone markers carry no length
            continue;
        } else {
            if pos + 1 >= data.len() {
                return Err(PdfError::InvalidImage("Truncated JPEG file".to_string()));
            }
            let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
            pos += length;
        }
    }

    let (width, height, components, precision) = frame.ok_or_else(|| {
        PdfError::InvalidImage("Could not find JPEG image dimensions".to_string())
    })?;
    if width == 0 || height == 0 {
        return Err(PdfError::InvalidImage("JPEG has a zero dimension".to_string()));
    }

    let color_space = match components {
        1 => ImageColorSpace::DeviceGray,
        3 => ImageColorSpace::DeviceRGB,
        4 => ImageColorSpace::DeviceCMYK,
        _ => {
            return Err(PdfError::UnsupportedImage(format!(
                "Unsupported number of JPEG components: {components}"
            )))
        }
    };

    Ok(JpegInfo {
        width,
        height,
        color_space,
        bits_per_component: precision.min(8),
    })
}

/// Uses the `image` crate's JPEG decoder to classify the frame.
#[cfg(feature = "external-images")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

#[cfg(feature = "external-images")]
impl JpegDecoder for ImageCrateDecoder {
    fn decode(&self, data: &[u8]) -> Result<JpegInfo> {
        use ::image::codecs::jpeg::JpegDecoder as Decoder;
        use ::image::{ExtendedColorType, ImageDecoder};
        use std::io::Cursor;

        let decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| PdfError::InvalidImage(format!("JPEG decode failed: {e}")))?;
        let (width, height) = decoder.dimensions();
        let color_space = match decoder.original_color_type() {
            ExtendedColorType::L8 | ExtendedColorType::L16 => ImageColorSpace::DeviceGray,
            ExtendedColorType::Cmyk8 => ImageColorSpace::DeviceCMYK,
            _ => ImageColorSpace::DeviceRGB,
        };

        Ok(JpegInfo {
            width,
            height,
            color_space,
            bits_per_component: 8,
        })
    }
}
