//! Normalized image resources.
//!
//! Every decoded source, whatever its format, ends up as an
//! [`ImageResource`]: pixel size, color space, bit depth and a payload that
//! can be written as an image XObject stream without further processing.

use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId};

/// Color spaces for images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageColorSpace {
    /// Grayscale
    DeviceGray,
    /// RGB color
    DeviceRGB,
    /// CMYK color
    DeviceCMYK,
    /// Palette lookup into DeviceRGB
    Indexed,
}

impl ImageColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ImageColorSpace::DeviceGray => "DeviceGray",
            ImageColorSpace::DeviceRGB => "DeviceRGB",
            ImageColorSpace::DeviceCMYK => "DeviceCMYK",
            ImageColorSpace::Indexed => "Indexed",
        }
    }
}

/// Stream filter the payload is encoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// zlib/deflate, used for PNG data
    FlateDecode,
    /// baseline JPEG, embedded unchanged
    DCTDecode,
}

impl ImageFilter {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ImageFilter::FlateDecode => "FlateDecode",
            ImageFilter::DCTDecode => "DCTDecode",
        }
    }
}

/// PNG predictor parameters (`/Predictor 15`) for payloads that still carry
/// per-scanline filter bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorParams {
    pub colors: u8,
    pub bits_per_component: u8,
    pub columns: u32,
}

impl PredictorParams {
    fn to_dictionary(self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Predictor", 15);
        dict.set("Colors", self.colors as i64);
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set("Columns", self.columns);
        dict
    }
}

/// A decoded image ready to be embedded
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResource {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) color_space: ImageColorSpace,
    pub(crate) bits_per_component: u8,
    pub(crate) filter: ImageFilter,
    pub(crate) predictor: Option<PredictorParams>,
    pub(crate) data: Vec<u8>,
    /// Raw RGB triples for indexed images
    pub(crate) palette: Vec<u8>,
    /// Color-key mask values (one per component, or a palette index)
    pub(crate) transparency: Vec<u8>,
    pub(crate) soft_mask: Option<Box<ImageResource>>,
}

impl ImageResource {
    /// An already DCT-encoded JPEG payload.
    pub fn jpeg(
        width: u32,
        height: u32,
        color_space: ImageColorSpace,
        bits_per_component: u8,
        data: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            color_space,
            bits_per_component,
            filter: ImageFilter::DCTDecode,
            predictor: None,
            data,
            palette: Vec::new(),
            transparency: Vec::new(),
            soft_mask: None,
        }
    }

    /// An 8-bit gray alpha channel, already deflated, without predictor bytes.
    pub(crate) fn soft_mask_of(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            color_space: ImageColorSpace::DeviceGray,
            bits_per_component: 8,
            filter: ImageFilter::FlateDecode,
            predictor: None,
            data,
            palette: Vec::new(),
            transparency: Vec::new(),
            soft_mask: None,
        }
    }

    /// Get image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_space(&self) -> ImageColorSpace {
        self.color_space
    }

    pub fn bits_per_component(&self) -> u8 {
        self.bits_per_component
    }

    pub fn filter(&self) -> ImageFilter {
        self.filter
    }

    pub fn predictor(&self) -> Option<PredictorParams> {
        self.predictor
    }

    /// Get the encoded payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn palette(&self) -> &[u8] {
        &self.palette
    }

    pub fn transparency(&self) -> &[u8] {
        &self.transparency
    }

    pub fn soft_mask(&self) -> Option<&ImageResource> {
        self.soft_mask.as_deref()
    }

    /// Build the XObject dictionary. `soft_mask` and `palette` are the ids of
    /// the companion objects; an indexed image without a palette id is an
    /// internal error.
    pub fn to_dictionary(
        &self,
        soft_mask: Option<ObjectId>,
        palette: Option<ObjectId>,
    ) -> Result<Dictionary> {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::name("XObject"));
        dict.set("Subtype", Object::name("Image"));
        dict.set("Width", self.width);
        dict.set("Height", self.height);

        match self.color_space {
            ImageColorSpace::Indexed => {
                let palette_id = palette.ok_or_else(|| {
                    PdfError::InvalidReference("indexed image without palette object".to_string())
                })?;
                let hival = (self.palette.len() / 3).saturating_sub(1);
                dict.set(
                    "ColorSpace",
                    Object::Array(vec![
                        Object::name("Indexed"),
                        Object::name("DeviceRGB"),
                        Object::from(hival),
                        Object::Reference(palette_id),
                    ]),
                );
            }
            other => {
                dict.set("ColorSpace", Object::name(other.pdf_name()));
                if other == ImageColorSpace::DeviceCMYK {
                    dict.set(
                        "Decode",
                        Object::Array(
                            [1, 0, 1, 0, 1, 0, 1, 0]
                                .into_iter()
                                .map(Object::from)
                                .collect(),
                        ),
                    );
                }
            }
        }

        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set("Filter", Object::name(self.filter.pdf_name()));
        if let Some(params) = self.predictor {
            dict.set("DecodeParms", params.to_dictionary());
        }

        if !self.transparency.is_empty() {
            let mask = self
                .transparency
                .iter()
                .flat_map(|&v| [Object::from(v as i64), Object::from(v as i64)])
                .collect();
            dict.set("Mask", Object::Array(mask));
        }

        if self.soft_mask.is_some() {
            let id = soft_mask.ok_or_else(|| {
                PdfError::InvalidReference("soft mask object was not allocated".to_string())
            })?;
            dict.set("SMask", Object::Reference(id));
        }

        Ok(dict)
    }
}
