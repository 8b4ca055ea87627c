//! Page geometry and per-page content buffers.

use crate::error::{PdfError, Result};
use crate::link::PageLink;
use std::str::FromStr;

/// User unit in which all coordinates and sizes are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    Point,
    #[default]
    Millimeter,
    Centimeter,
    Inch,
}

impl Unit {
    /// Points per user unit.
    pub fn scale_factor(&self) -> f64 {
        match self {
            Unit::Point => 1.0,
            Unit::Millimeter => 72.0 / 25.4,
            Unit::Centimeter => 72.0 / 2.54,
            Unit::Inch => 72.0,
        }
    }
}

impl FromStr for Unit {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt" => Ok(Unit::Point),
            "mm" => Ok(Unit::Millimeter),
            "cm" => Ok(Unit::Centimeter),
            "in" => Ok(Unit::Inch),
            other => Err(PdfError::InvalidConfiguration(format!(
                "Incorrect unit: {other}"
            ))),
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "portrait" => Ok(Orientation::Portrait),
            "l" | "landscape" => Ok(Orientation::Landscape),
            other => Err(PdfError::InvalidConfiguration(format!(
                "Incorrect orientation: {other}"
            ))),
        }
    }
}

/// Standard page formats, plus arbitrary sizes given in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Portrait dimensions in points.
    pub fn dimensions(&self) -> PageDimensions {
        let (width, height) = match self {
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (420.94, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        };
        PageDimensions::new(width, height)
    }
}

impl FromStr for PageSize {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            other => Err(PdfError::InvalidConfiguration(format!(
                "Unknown page size: {other}"
            ))),
        }
    }
}

/// A page size normalized to its short and long sides, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    short_side: f64,
    long_side: f64,
}

impl PageDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            short_side: width.min(height),
            long_side: width.max(height),
        }
    }

    /// Width and height in points for the given orientation.
    pub fn oriented(&self, orientation: Orientation) -> (f64, f64) {
        match orientation {
            Orientation::Portrait => (self.short_side, self.long_side),
            Orientation::Landscape => (self.long_side, self.short_side),
        }
    }
}

/// A finished or in-progress page: raw content operators, its size in
/// points and the link annotations placed on it.
#[derive(Debug, Clone)]
pub struct Page {
    pub(crate) content: Vec<u8>,
    pub(crate) width_pt: f64,
    pub(crate) height_pt: f64,
    /// Whether the size differs from the document default
    pub(crate) custom_size: bool,
    pub(crate) links: Vec<PageLink>,
}

impl Page {
    pub(crate) fn new(width_pt: f64, height_pt: f64, custom_size: bool) -> Self {
        Self {
            content: Vec::new(),
            width_pt,
            height_pt,
            custom_size,
            links: Vec::new(),
        }
    }

    /// Width in points.
    pub fn width(&self) -> f64 {
        self.width_pt
    }

    /// Height in points.
    pub fn height(&self) -> f64 {
        self.height_pt
    }

    /// The uncompressed content stream.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn links(&self) -> &[PageLink] {
        &self.links
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) {
        self.content.extend_from_slice(bytes);
        self.content.push(b'\n');
    }
}
