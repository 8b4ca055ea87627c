//! Page decoration and page-break strategies.
//!
//! A [`PageTemplate`] draws the repeating parts of every page; a
//! [`PageBreakPolicy`] decides what happens when content reaches the bottom
//! margin. Both are installed on the [`Document`] and called back with
//! mutable access to it.

use crate::document::Document;
use crate::error::Result;
use std::any::Any;

/// Header and footer drawn on every page.
///
/// The header runs right after a page begins and the footer right before it
/// ends. Automatic page breaks are suppressed while either runs.
pub trait PageTemplate {
    fn header(&mut self, _doc: &mut Document) -> Result<()> {
        Ok(())
    }

    fn footer(&mut self, _doc: &mut Document) -> Result<()> {
        Ok(())
    }
}

/// Decides whether content that overflows the bottom margin starts a new
/// page. Returning `false` means the policy moved the cursor somewhere that
/// has room, for example the top of the next column.
pub trait PageBreakPolicy: Any {
    fn accept_page_break(&mut self, doc: &mut Document) -> bool;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Flows content through a fixed number of equal-width columns before
/// breaking the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    left: f64,
    width: f64,
    spacing: f64,
    columns: usize,
    current: usize,
    top: f64,
}

impl ColumnLayout {
    /// `columns` columns of `width`, separated by `spacing`, the first one
    /// starting at `left`.
    pub fn new(left: f64, width: f64, spacing: f64, columns: usize) -> Self {
        Self {
            left,
            width,
            spacing,
            columns: columns.max(1),
            current: 0,
            top: 0.0,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// The y position columns restart from.
    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn set_top(&mut self, y: f64) {
        self.top = y;
    }

    pub fn column_x(&self, column: usize) -> f64 {
        self.left + column as f64 * (self.width + self.spacing)
    }

    /// Move the left margin and the cursor to `column`.
    pub fn select(&mut self, doc: &mut Document, column: usize) {
        self.current = column.min(self.columns - 1);
        let x = self.column_x(self.current);
        doc.set_left_margin(x);
        doc.set_x(x);
    }
}

impl PageBreakPolicy for ColumnLayout {
    fn accept_page_break(&mut self, doc: &mut Document) -> bool {
        if self.current + 1 < self.columns {
            self.select(doc, self.current + 1);
            doc.set_y(self.top);
            false
        } else {
            self.select(doc, 0);
            true
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
