//! Core fonts, text measurement and text layout.

mod core_widths;
pub mod encoding;
mod font;
mod layout;
mod markup;
pub mod metrics;

pub use font::{CoreFont, FontFamily, FontKey, FontStyle};
pub use layout::{BorderSides, CellAdvance, CellBorder, CellOptions, TextAlign};
pub use markup::{tokenize, MarkupTag, MarkupToken};
