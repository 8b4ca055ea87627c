//! Cells, wrapped paragraphs and flowing text.
//!
//! All three are built on a single cell primitive that paints an optional
//! background and border, shows one line of text and advances the cursor.
//! Text is encoded to WinAnsi up front so that widths are measured on the
//! same bytes that end up in the content stream.

use crate::document::Document;
use crate::error::Result;
use crate::link::LinkTarget;
use crate::text::encoding;
use crate::text::font::CoreFont;
use crate::text::metrics::{byte_width, encoded_width};
use bitflags::bitflags;
use std::io::Write;

bitflags! {
    /// Individual cell edges
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BorderSides: u8 {
        const LEFT = 0b0001;
        const TOP = 0b0010;
        const RIGHT = 0b0100;
        const BOTTOM = 0b1000;
    }
}

/// Border drawn around a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellBorder {
    #[default]
    None,
    /// A closed rectangle, painted together with the background
    Frame,
    /// A subset of edges, each drawn as a separate line
    Sides(BorderSides),
}

impl CellBorder {
    fn sides(sides: BorderSides) -> Self {
        if sides.is_empty() {
            CellBorder::None
        } else {
            CellBorder::Sides(sides)
        }
    }
}

/// Horizontal placement of text inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    /// Stretch word spacing to the full width; only meaningful for
    /// [`Document::multi_cell`], single cells render it left-aligned
    Justified,
}

/// Where the cursor goes after a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellAdvance {
    /// To the right of the cell
    #[default]
    Right,
    /// To the start of the next line
    NextLine,
    /// Directly below the cell
    Below,
}

/// Drawing options for [`Document::cell`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellOptions {
    pub border: CellBorder,
    pub advance: CellAdvance,
    pub align: TextAlign,
    pub fill: bool,
    pub link: Option<LinkTarget>,
}

impl CellOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn border(mut self, border: CellBorder) -> Self {
        self.border = border;
        self
    }

    pub fn advance(mut self, advance: CellAdvance) -> Self {
        self.advance = advance;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn link(mut self, link: impl Into<LinkTarget>) -> Self {
        self.link = Some(link.into());
        self
    }
}

impl Document {
    /// Print a cell: an optional background and border with one line of
    /// text inside. A width of 0 extends the cell to the right margin.
    pub fn cell(&mut self, w: f64, h: f64, text: &str, options: &CellOptions) -> Result<()> {
        let bytes = encoding::encode(text);
        self.emit_cell(w, h, &bytes, options)
    }

    /// Print text wrapped to lines of width `w` (0 = up to the right
    /// margin), each line a cell of height `h`. Breaks happen at spaces,
    /// explicit newlines, or inside a word that does not fit on its own.
    ///
    /// Edges in `border` are applied per line: the top edge to the first
    /// line, the bottom edge to the last, left and right edges to all. The
    /// cursor ends below the paragraph at the left margin.
    pub fn multi_cell(
        &mut self,
        w: f64,
        h: f64,
        text: &str,
        border: CellBorder,
        align: TextAlign,
        fill: bool,
    ) -> Result<()> {
        let font = self.current_font_metrics()?;
        let w = if w == 0.0 {
            self.w - self.margins.right - self.x
        } else {
            w
        };
        let wmax = (w - 2.0 * self.cell_margin) * 1000.0 / self.font_size;
        let s: Vec<u8> = encoding::encode(text)
            .into_iter()
            .filter(|&b| b != b'\r')
            .collect();
        let mut nb = s.len();
        if nb > 0 && s[nb - 1] == b'\n' {
            nb -= 1;
        }

        let lr = BorderSides::LEFT | BorderSides::RIGHT;
        let (mut first, rest, bottom) = match border {
            CellBorder::None => (BorderSides::empty(), BorderSides::empty(), false),
            CellBorder::Frame => (lr | BorderSides::TOP, lr, true),
            CellBorder::Sides(sides) => {
                let rest = sides & lr;
                let first = if sides.contains(BorderSides::TOP) {
                    rest | BorderSides::TOP
                } else {
                    rest
                };
                (first, rest, sides.contains(BorderSides::BOTTOM))
            }
        };
        let line = |sides: BorderSides| CellOptions {
            border: CellBorder::sides(sides),
            advance: CellAdvance::Below,
            align,
            fill,
            link: None,
        };

        let mut sep: Option<usize> = None;
        let mut i = 0;
        let mut j = 0;
        let mut l: u32 = 0;
        let mut ls: u32 = 0;
        let mut ns = 0usize;
        let mut nl = 1;

        while i < nb {
            let c = s[i];
            if c == b'\n' {
                self.reset_word_spacing()?;
                self.emit_cell(w, h, &s[j..i], &line(first))?;
                i += 1;
                sep = None;
                j = i;
                l = 0;
                ns = 0;
                nl += 1;
                if nl == 2 {
                    first = rest;
                }
                continue;
            }
            if c == b' ' {
                sep = Some(i);
                ls = l;
                ns += 1;
            }
            l += byte_width(font, c);
            if l as f64 > wmax {
                match sep {
                    None => {
                        if i == j {
                            i += 1;
                        }
                        self.reset_word_spacing()?;
                        self.emit_cell(w, h, &s[j..i], &line(first))?;
                    }
                    Some(sep) => {
                        if align == TextAlign::Justified {
                            self.word_spacing = if ns > 1 {
                                (wmax - ls as f64) / 1000.0 * self.font_size / (ns - 1) as f64
                            } else {
                                0.0
                            };
                            let op = format!("{:.3} Tw", self.word_spacing * self.k);
                            self.out_str(&op)?;
                        }
                        self.emit_cell(w, h, &s[j..sep], &line(first))?;
                        i = sep + 1;
                    }
                }
                sep = None;
                j = i;
                l = 0;
                ns = 0;
                nl += 1;
                if nl == 2 {
                    first = rest;
                }
            } else {
                i += 1;
            }
        }

        self.reset_word_spacing()?;
        if bottom {
            first |= BorderSides::BOTTOM;
        }
        self.emit_cell(w, h, &s[j..i], &line(first))?;
        self.x = self.margins.left;
        Ok(())
    }

    /// Print flowing text starting at the cursor. Lines wrap at the right
    /// margin and continue from the left margin; the cursor ends right
    /// after the last character, so further output continues the line.
    pub fn write(&mut self, h: f64, text: &str, link: Option<LinkTarget>) -> Result<()> {
        let font = self.current_font_metrics()?;
        let mut w = self.w - self.margins.right - self.x;
        let mut wmax = (w - 2.0 * self.cell_margin) * 1000.0 / self.font_size;
        let s: Vec<u8> = encoding::encode(text)
            .into_iter()
            .filter(|&b| b != b'\r')
            .collect();
        let nb = s.len();
        let line = CellOptions {
            advance: CellAdvance::Below,
            link: link.clone(),
            ..CellOptions::default()
        };

        let mut sep: Option<usize> = None;
        let mut i = 0;
        let mut j = 0;
        let mut l: u32 = 0;
        let mut nl = 1;

        while i < nb {
            let c = s[i];
            if c == b'\n' {
                self.emit_cell(w, h, &s[j..i], &line)?;
                i += 1;
                sep = None;
                j = i;
                l = 0;
                if nl == 1 {
                    self.x = self.margins.left;
                    w = self.w - self.margins.right - self.x;
                    wmax = (w - 2.0 * self.cell_margin) * 1000.0 / self.font_size;
                }
                nl += 1;
                continue;
            }
            if c == b' ' {
                sep = Some(i);
            }
            l += byte_width(font, c);
            if l as f64 > wmax {
                match sep {
                    None => {
                        if self.x > self.margins.left {
                            // Nothing fits after the text already on this line
                            self.x = self.margins.left;
                            self.y += h;
                            w = self.w - self.margins.right - self.x;
                            wmax = (w - 2.0 * self.cell_margin) * 1000.0 / self.font_size;
                            i += 1;
                            nl += 1;
                            continue;
                        }
                        if i == j {
                            i += 1;
                        }
                        self.emit_cell(w, h, &s[j..i], &line)?;
                    }
                    Some(sep) => {
                        self.emit_cell(w, h, &s[j..sep], &line)?;
                        i = sep + 1;
                    }
                }
                sep = None;
                j = i;
                l = 0;
                if nl == 1 {
                    self.x = self.margins.left;
                    w = self.w - self.margins.right - self.x;
                    wmax = (w - 2.0 * self.cell_margin) * 1000.0 / self.font_size;
                }
                nl += 1;
            } else {
                i += 1;
            }
        }

        if i != j {
            let tail = CellOptions {
                link,
                ..CellOptions::default()
            };
            let width = l as f64 / 1000.0 * self.font_size;
            self.emit_cell(width, h, &s[j..], &tail)?;
        }
        Ok(())
    }

    /// Print a string with its baseline at (x, y). The cursor does not move.
    pub fn text(&mut self, x: f64, y: f64, text: &str) -> Result<()> {
        let font = self.current_font_metrics()?;
        let bytes = encoding::encode(text);
        let k = self.k;

        let mut s = Vec::new();
        write!(s, "BT {:.2} {:.2} Td (", x * k, (self.h - y) * k)?;
        s.extend_from_slice(&encoding::escape(&bytes));
        s.extend_from_slice(b") Tj ET");
        if self.underline && !bytes.is_empty() {
            s.push(b' ');
            s.extend_from_slice(self.underline_operator(font, x, y, &bytes).as_bytes());
        }
        let s = self.with_text_color(s);
        self.out(&s)
    }

    /// The cell primitive, on WinAnsi bytes.
    fn emit_cell(&mut self, w: f64, h: f64, bytes: &[u8], options: &CellOptions) -> Result<()> {
        let k = self.k;
        self.check_page_break(h)?;

        let w = if w == 0.0 {
            self.w - self.margins.right - self.x
        } else {
            w
        };
        let (x, y, page_h) = (self.x, self.y, self.h);

        let mut s = Vec::new();
        if options.fill || options.border == CellBorder::Frame {
            let op = match (options.fill, options.border == CellBorder::Frame) {
                (true, true) => "B",
                (true, false) => "f",
                _ => "S",
            };
            write!(
                s,
                "{:.2} {:.2} {:.2} {:.2} re {} ",
                x * k,
                (page_h - y) * k,
                w * k,
                -h * k,
                op
            )?;
        }
        if let CellBorder::Sides(sides) = options.border {
            let (left, right) = (x * k, (x + w) * k);
            let (top, bottom) = ((page_h - y) * k, (page_h - (y + h)) * k);
            if sides.contains(BorderSides::LEFT) {
                write!(s, "{left:.2} {top:.2} m {left:.2} {bottom:.2} l S ")?;
            }
            if sides.contains(BorderSides::TOP) {
                write!(s, "{left:.2} {top:.2} m {right:.2} {top:.2} l S ")?;
            }
            if sides.contains(BorderSides::RIGHT) {
                write!(s, "{right:.2} {top:.2} m {right:.2} {bottom:.2} l S ")?;
            }
            if sides.contains(BorderSides::BOTTOM) {
                write!(s, "{left:.2} {bottom:.2} m {right:.2} {bottom:.2} l S ")?;
            }
        }

        if !bytes.is_empty() {
            let font = self.current_font_metrics()?;
            let text_width = encoded_width(font, bytes) as f64 * self.font_size / 1000.0;
            let dx = match options.align {
                TextAlign::Right => w - self.cell_margin - text_width,
                TextAlign::Center => (w - text_width) / 2.0,
                _ => self.cell_margin,
            };
            let baseline = y + 0.5 * h + 0.3 * self.font_size;

            let mut text = Vec::new();
            write!(
                text,
                "BT {:.2} {:.2} Td (",
                (x + dx) * k,
                (page_h - baseline) * k
            )?;
            text.extend_from_slice(&encoding::escape(bytes));
            text.extend_from_slice(b") Tj ET");
            if self.underline {
                text.push(b' ');
                text.extend_from_slice(
                    self.underline_operator(font, x + dx, baseline, bytes)
                        .as_bytes(),
                );
            }
            s.extend(self.with_text_color(text));

            if let Some(link) = &options.link {
                self.link(
                    x + dx,
                    y + 0.5 * h - 0.5 * self.font_size,
                    text_width,
                    self.font_size,
                    link.clone(),
                )?;
            }
        }

        if !s.is_empty() {
            self.out(&s)?;
        }
        self.last_height = h;
        match options.advance {
            CellAdvance::Right => self.x += w,
            CellAdvance::NextLine => {
                self.y += h;
                self.x = self.margins.left;
            }
            CellAdvance::Below => self.y += h,
        }
        Ok(())
    }

    /// Filled rectangle under text whose baseline is at `y`.
    fn underline_operator(&self, font: &CoreFont, x: f64, y: f64, bytes: &[u8]) -> String {
        let up = font.underline_position as f64;
        let ut = font.underline_thickness as f64;
        let spaces = bytes.iter().filter(|&&b| b == b' ').count() as f64;
        let width = encoded_width(font, bytes) as f64 * self.font_size / 1000.0
            + self.word_spacing * spaces;
        format!(
            "{:.2} {:.2} {:.2} {:.2} re f",
            x * self.k,
            (self.h - (y - up / 1000.0 * self.font_size)) * self.k,
            width * self.k,
            -ut / 1000.0 * self.font_size_pt
        )
    }

    /// Wrap text operators in `q <text color> ... Q` when the text color
    /// differs from the fill color.
    fn with_text_color(&self, text: Vec<u8>) -> Vec<u8> {
        if !self.color_flag {
            return text;
        }
        let mut wrapped = format!("q {} ", self.text_color.fill_operator()).into_bytes();
        wrapped.extend(text);
        wrapped.extend_from_slice(b" Q");
        wrapped
    }

    fn reset_word_spacing(&mut self) -> Result<()> {
        if self.word_spacing > 0.0 {
            self.word_spacing = 0.0;
            self.out_str("0 Tw")?;
        }
        Ok(())
    }
}
