//! Text measurement against core font width tables.
//!
//! Widths are integer advances in 1/1000 em. A character the font cannot
//! address is measured as `?`, the glyph it is rendered with.

use crate::text::encoding;
use crate::text::font::CoreFont;

/// Advance of a single WinAnsi byte in 1/1000 em.
pub fn byte_width(font: &CoreFont, byte: u8) -> u32 {
    font.widths[byte as usize] as u32
}

/// Sum of advances of an already-encoded byte string, in 1/1000 em.
pub fn encoded_width(font: &CoreFont, bytes: &[u8]) -> u32 {
    bytes.iter().map(|&b| byte_width(font, b)).sum()
}

/// Width of `text` in user units at the given font size (also in user units).
pub fn text_width(font: &CoreFont, text: &str, font_size: f64) -> f64 {
    let units = encoded_width(font, &encoding::encode(text));
    units as f64 * font_size / 1000.0
}
