//! Core font identities and the built-in metrics registry.

use crate::error::{PdfError, Result};
use crate::text::core_widths::*;
use bitflags::bitflags;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The five core font families. Arial is accepted as an alias of Helvetica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Courier,
    Helvetica,
    Times,
    Symbol,
    ZapfDingbats,
}

impl FontFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFamily::Courier => "courier",
            FontFamily::Helvetica => "helvetica",
            FontFamily::Times => "times",
            FontFamily::Symbol => "symbol",
            FontFamily::ZapfDingbats => "zapfdingbats",
        }
    }

    /// Symbol and ZapfDingbats have no bold or italic variants.
    pub fn has_styles(&self) -> bool {
        !matches!(self, FontFamily::Symbol | FontFamily::ZapfDingbats)
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontFamily {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "courier" => Ok(FontFamily::Courier),
            "helvetica" | "arial" => Ok(FontFamily::Helvetica),
            "times" => Ok(FontFamily::Times),
            "symbol" => Ok(FontFamily::Symbol),
            "zapfdingbats" => Ok(FontFamily::ZapfDingbats),
            other => Err(PdfError::FontError(format!("Undefined font: {other}"))),
        }
    }
}

bitflags! {
    /// Style modifiers accepted by `set_font`: any combination of `B`, `I`
    /// and `U`, in any order and case.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        const BOLD = 0b001;
        const ITALIC = 0b010;
        const UNDERLINE = 0b100;
    }
}

impl FontStyle {
    /// Style without the underline flag, which is drawn rather than selected.
    pub fn face(self) -> FontStyle {
        self.difference(FontStyle::UNDERLINE)
    }
}

impl FromStr for FontStyle {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        let mut style = FontStyle::empty();
        for ch in s.chars() {
            match ch.to_ascii_uppercase() {
                'B' => style |= FontStyle::BOLD,
                'I' => style |= FontStyle::ITALIC,
                'U' => style |= FontStyle::UNDERLINE,
                _ => {
                    return Err(PdfError::FontError(format!(
                        "Undefined font style: {s}"
                    )))
                }
            }
        }
        Ok(style)
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(FontStyle::BOLD) {
            f.write_str("B")?;
        }
        if self.contains(FontStyle::ITALIC) {
            f.write_str("I")?;
        }
        if self.contains(FontStyle::UNDERLINE) {
            f.write_str("U")?;
        }
        Ok(())
    }
}

/// Identity of a registered font face: family plus bold/italic.
///
/// Renders as the lowercase key used by the metrics registry, e.g.
/// `helveticab` or `timesbi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontKey {
    family: FontFamily,
    style: FontStyle,
}

impl FontKey {
    pub fn new(family: FontFamily, style: FontStyle) -> Self {
        let style = if family.has_styles() {
            style.face()
        } else {
            FontStyle::empty()
        };
        Self { family, style }
    }

    pub fn family(&self) -> FontFamily {
        self.family
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if self.style.contains(FontStyle::BOLD) {
            f.write_str("b")?;
        }
        if self.style.contains(FontStyle::ITALIC) {
            f.write_str("i")?;
        }
        Ok(())
    }
}

/// Metrics of a built-in font: PostScript name, glyph widths by WinAnsi byte
/// and underline geometry, all in 1/1000 em.
#[derive(Debug)]
pub struct CoreFont {
    pub name: &'static str,
    pub widths: &'static [u16; 256],
    pub underline_position: i16,
    pub underline_thickness: i16,
}

impl CoreFont {
    const fn new(name: &'static str, widths: &'static [u16; 256]) -> Self {
        Self {
            name,
            widths,
            underline_position: -100,
            underline_thickness: 50,
        }
    }

    /// Symbol and ZapfDingbats use their built-in encodings.
    pub fn uses_win_ansi(&self) -> bool {
        self.name != "Symbol" && self.name != "ZapfDingbats"
    }

    /// Look up the metrics of a core font face.
    pub fn lookup(key: &FontKey) -> Result<&'static CoreFont> {
        CORE_FONTS
            .get(key.to_string().as_str())
            .ok_or_else(|| PdfError::FontError(format!("Undefined font: {key}")))
    }
}

lazy_static::lazy_static! {
    static ref CORE_FONTS: HashMap<&'static str, CoreFont> = {
        let mut fonts = HashMap::new();

        fonts.insert("courier", CoreFont::new("Courier", &COURIER_WIDTHS));
        fonts.insert("courierb", CoreFont::new("Courier-Bold", &COURIERB_WIDTHS));
        fonts.insert("courieri", CoreFont::new("Courier-Oblique", &COURIERI_WIDTHS));
        fonts.insert("courierbi", CoreFont::new("Courier-BoldOblique", &COURIERBI_WIDTHS));

        fonts.insert("helvetica", CoreFont::new("Helvetica", &HELVETICA_WIDTHS));
        fonts.insert("helveticab", CoreFont::new("Helvetica-Bold", &HELVETICAB_WIDTHS));
        fonts.insert("helveticai", CoreFont::new("Helvetica-Oblique", &HELVETICAI_WIDTHS));
        fonts.insert("helveticabi", CoreFont::new("Helvetica-BoldOblique", &HELVETICABI_WIDTHS));

        fonts.insert("times", CoreFont::new("Times-Roman", &TIMES_WIDTHS));
        fonts.insert("timesb", CoreFont::new("Times-Bold", &TIMESB_WIDTHS));
        fonts.insert("timesi", CoreFont::new("Times-Italic", &TIMESI_WIDTHS));
        fonts.insert("timesbi", CoreFont::new("Times-BoldItalic", &TIMESBI_WIDTHS));

        fonts.insert("symbol", CoreFont::new("Symbol", &SYMBOL_WIDTHS));
        fonts.insert("zapfdingbats", CoreFont::new("ZapfDingbats", &ZAPFDINGBATS_WIDTHS));

        fonts
    };
}
