//! # pagewright
//!
//! A procedural PDF generation engine. A [`Document`] keeps a cursor, a
//! current font and a current set of colors; text cells, paragraphs, lines,
//! rectangles and images are appended to the active page, and the file is
//! serialized once when the document is closed.
//!
//! ## Features
//!
//! - **Core fonts**: the 14 standard Type1 fonts with built-in metrics, no embedding
//! - **Text layout**: single cells, word-wrapped paragraphs and flowing text
//! - **Inline markup**: `<b>`, `<i>`, `<u>`, `<a href>` and `<br>` tags
//! - **Images**: JPEG passthrough and PNG, including palettes and alpha channels
//! - **Links**: outbound URIs and internal anchors
//! - **Page templates**: header and footer callbacks, multi-column page breaks
//! - **Compression**: Flate-compressed content streams
//!
//! ## Quick Start
//!
//! ```rust
//! use pagewright::{CellAdvance, CellBorder, CellOptions, Document, Result, TextAlign};
//!
//! # fn main() -> Result<()> {
//! let mut doc = Document::new();
//! doc.set_title("Quarterly report");
//! doc.add_page()?;
//!
//! doc.set_font("Helvetica", "B", 16.0)?;
//! let title = CellOptions::new()
//!     .border(CellBorder::Frame)
//!     .align(TextAlign::Center)
//!     .advance(CellAdvance::NextLine);
//! doc.cell(0.0, 10.0, "Quarterly report", &title)?;
//!
//! doc.set_font("Times", "", 12.0)?;
//! doc.multi_cell(0.0, 5.0, "A long paragraph that wraps ...", CellBorder::None, TextAlign::Justified, false)?;
//!
//! let bytes = doc.to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF-1.3"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`document`] - Document state, cursor, margins and drawing operations
//! - [`page`] - Units, page formats and orientation
//! - [`text`] - Core fonts, metrics, cells, paragraphs and markup
//! - [`graphics`] - Colors and image decoding
//! - [`link`] - Hyperlinks and internal anchors
//! - [`template`] - Header/footer hooks and page break policies
//! - [`writer`] - Low-level PDF object serialization

pub mod compression;
pub mod document;
pub mod error;
pub mod graphics;
pub mod link;
pub mod objects;
pub mod page;
pub mod resources;
pub mod template;
pub mod text;
pub mod writer;

pub use document::{
    Document, DocumentConfig, DocumentMetadata, DocumentState, Margins, PageLayout, RectStyle,
    Zoom,
};
pub use error::{PdfError, Result};
pub use graphics::{Color, ImageKey, ImageSource, ImageType, JpegDecoder, JpegInfo, MarkerScanDecoder};
pub use link::{LinkAnchor, LinkId, LinkTarget};
pub use page::{Orientation, Page, PageSize, Unit};
pub use template::{ColumnLayout, PageBreakPolicy, PageTemplate};
pub use text::{
    BorderSides, CellAdvance, CellBorder, CellOptions, FontFamily, FontStyle, TextAlign,
};

/// Current version of pagewright
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
