use crate::error::{PdfError, Result};
use crate::graphics::{default_decoder, Color, ImageSource, JpegDecoder};
use crate::link::{LinkAnchor, LinkTarget};
use crate::page::{Orientation, Page, PageDimensions, PageSize, Unit};
use crate::resources::ResourceRegistry;
use crate::template::{PageBreakPolicy, PageTemplate};
use crate::text::{metrics, CoreFont, FontFamily, FontKey, FontStyle};
use crate::writer::PdfWriter;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, warn};

/// Lifecycle of a [`Document`]. It only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Unopened,
    Open,
    PageActive,
    Closed,
}

/// Settings fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentConfig {
    pub orientation: Orientation,
    pub unit: Unit,
    pub page_size: PageSize,
    /// Deflate page content streams
    pub compress: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            unit: Unit::Millimeter,
            page_size: PageSize::A4,
            compress: true,
        }
    }
}

/// Initial zoom a viewer should open the document with.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Zoom {
    #[default]
    Default,
    FullPage,
    FullWidth,
    Real,
    /// Zoom factor in percent
    Percent(f64),
}

/// Initial page layout a viewer should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageLayout {
    #[default]
    Default,
    Single,
    Continuous,
    Two,
}

/// Painting mode for [`Document::rect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RectStyle {
    #[default]
    Stroke,
    Fill,
    FillStroke,
}

impl RectStyle {
    pub(crate) fn operator(&self) -> &'static str {
        match self {
            RectStyle::Stroke => "S",
            RectStyle::Fill => "f",
            RectStyle::FillStroke => "B",
        }
    }
}

/// Metadata for a PDF document.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document keywords
    pub keywords: Option<String>,
    /// Software that created the original content
    pub creator: Option<String>,
    /// Date and time the document was created, `None` for the time of closing
    pub creation_date: Option<DateTime<Utc>>,
}

/// Page margins in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    /// Distance from the bottom edge that triggers an automatic page break
    pub bottom: f64,
}

/// A PDF document built procedurally, one page at a time.
///
/// The document keeps a cursor and a current style. Drawing operations
/// append content operators to the active page and move the cursor; text
/// that would cross the bottom margin starts a new page on its own. Nothing
/// is written until [`close`](Document::close).
///
/// # Example
///
/// ```rust
/// use pagewright::{CellOptions, Document};
///
/// let mut doc = Document::new();
/// doc.add_page()?;
/// doc.set_font("Arial", "B", 16.0)?;
/// doc.cell(40.0, 10.0, "Hello World!", &CellOptions::default())?;
/// let bytes = doc.to_bytes()?;
/// assert!(bytes.starts_with(b"%PDF-1.3"));
/// # Ok::<(), pagewright::PdfError>(())
/// ```
pub struct Document {
    pub(crate) state: DocumentState,
    pub(crate) pages: Vec<Page>,
    /// Points per user unit
    pub(crate) k: f64,
    default_orientation: Orientation,
    current_orientation: Orientation,
    default_size: PageDimensions,
    current_size: PageDimensions,
    pub(crate) w_pt: f64,
    pub(crate) h_pt: f64,
    pub(crate) w: f64,
    pub(crate) h: f64,
    pub(crate) margins: Margins,
    pub(crate) cell_margin: f64,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) last_height: f64,
    pub(crate) line_width: f64,
    pub(crate) resources: ResourceRegistry,
    pub(crate) font_family: Option<FontFamily>,
    pub(crate) font_style: FontStyle,
    pub(crate) underline: bool,
    pub(crate) font_size_pt: f64,
    /// Font size in user units
    pub(crate) font_size: f64,
    pub(crate) current_font: Option<usize>,
    pub(crate) draw_color: Color,
    pub(crate) fill_color: Color,
    pub(crate) text_color: Color,
    /// Text color differs from the fill color
    pub(crate) color_flag: bool,
    pub(crate) word_spacing: f64,
    auto_page_break: bool,
    page_break_trigger: f64,
    in_header: bool,
    in_footer: bool,
    pub(crate) zoom: Zoom,
    pub(crate) layout: PageLayout,
    pub(crate) metadata: DocumentMetadata,
    pub(crate) alias: Option<String>,
    pub(crate) compress: bool,
    pub(crate) pdf_minor_version: u8,
    pub(crate) links: Vec<Option<LinkAnchor>>,
    template: Option<Box<dyn PageTemplate>>,
    page_break_policy: Option<Box<dyn PageBreakPolicy>>,
    jpeg_decoder: Box<dyn JpegDecoder>,
    output: Vec<u8>,
}

impl Document {
    /// A portrait A4 document measured in millimetres.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        let k = config.unit.scale_factor();
        let default_size = config.page_size.dimensions();
        let (w_pt, h_pt) = default_size.oriented(config.orientation);
        let (w, h) = (w_pt / k, h_pt / k);
        // 1 cm
        let margin = 28.35 / k;

        Self {
            state: DocumentState::Unopened,
            pages: Vec::new(),
            k,
            default_orientation: config.orientation,
            current_orientation: config.orientation,
            default_size,
            current_size: default_size,
            w_pt,
            h_pt,
            w,
            h,
            margins: Margins {
                left: margin,
                top: margin,
                right: margin,
                bottom: 2.0 * margin,
            },
            cell_margin: margin / 10.0,
            x: margin,
            y: margin,
            last_height: 0.0,
            // 0.2 mm
            line_width: 0.567 / k,
            resources: ResourceRegistry::new(),
            font_family: None,
            font_style: FontStyle::empty(),
            underline: false,
            font_size_pt: 12.0,
            font_size: 12.0 / k,
            current_font: None,
            draw_color: Color::black(),
            fill_color: Color::black(),
            text_color: Color::black(),
            color_flag: false,
            word_spacing: 0.0,
            auto_page_break: true,
            page_break_trigger: h - 2.0 * margin,
            in_header: false,
            in_footer: false,
            zoom: Zoom::Default,
            layout: PageLayout::Default,
            metadata: DocumentMetadata::default(),
            alias: None,
            compress: config.compress,
            pdf_minor_version: 3,
            links: Vec::new(),
            template: None,
            page_break_policy: None,
            jpeg_decoder: default_decoder(),
            output: Vec::new(),
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Current page number, 0 before the first page.
    pub fn page_no(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Raw content operators of a page, numbered from 1.
    pub fn page_content(&self, page: usize) -> Option<&[u8]> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .map(Page::content)
    }

    /// PDF version written in the file header, e.g. `"1.3"`.
    pub fn pdf_version(&self) -> String {
        format!("1.{}", self.pdf_minor_version)
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Sets the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata.title = Some(title.into());
    }

    /// Sets the document author.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.metadata.author = Some(author.into());
    }

    /// Sets the document subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.metadata.subject = Some(subject.into());
    }

    /// Sets the document keywords.
    pub fn set_keywords(&mut self, keywords: impl Into<String>) {
        self.metadata.keywords = Some(keywords.into());
    }

    /// Sets the document creator (software that created the original document).
    pub fn set_creator(&mut self, creator: impl Into<String>) {
        self.metadata.creator = Some(creator.into());
    }

    /// Sets the document creation date.
    pub fn set_creation_date(&mut self, date: DateTime<Utc>) {
        self.metadata.creation_date = Some(date);
    }

    pub fn set_display_mode(&mut self, zoom: Zoom, layout: PageLayout) {
        self.zoom = zoom;
        self.layout = layout;
    }

    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    /// Every occurrence of `alias` in page content is replaced by the total
    /// number of pages when the document is closed.
    pub fn alias_page_count(&mut self, alias: impl Into<String>) {
        self.alias = Some(alias.into());
    }

    pub fn set_page_template(&mut self, template: impl PageTemplate + 'static) {
        self.template = Some(Box::new(template));
    }

    pub fn set_page_break_policy(&mut self, policy: impl PageBreakPolicy) {
        self.page_break_policy = Some(Box::new(policy));
    }

    /// The installed page-break policy, if it is a `P`.
    pub fn page_break_policy_mut<P: PageBreakPolicy>(&mut self) -> Option<&mut P> {
        self.page_break_policy
            .as_mut()
            .and_then(|policy| policy.as_any_mut().downcast_mut::<P>())
    }

    pub fn set_jpeg_decoder(&mut self, decoder: impl JpegDecoder + 'static) {
        self.jpeg_decoder = Box::new(decoder);
    }

    // Geometry and cursor

    /// Page width in user units.
    pub fn page_width(&self) -> f64 {
        self.w
    }

    /// Page height in user units.
    pub fn page_height(&self) -> f64 {
        self.h
    }

    /// Points per user unit.
    pub fn scale_factor(&self) -> f64 {
        self.k
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn left_margin(&self) -> f64 {
        self.margins.left
    }

    pub fn right_margin(&self) -> f64 {
        self.margins.right
    }

    pub fn top_margin(&self) -> f64 {
        self.margins.top
    }

    pub fn cell_margin(&self) -> f64 {
        self.cell_margin
    }

    /// Left, top and right margins. The right margin defaults to the left.
    pub fn set_margins(&mut self, left: f64, top: f64, right: Option<f64>) {
        self.margins.left = left;
        self.margins.top = top;
        self.margins.right = right.unwrap_or(left);
    }

    /// Also pushes the cursor right if it now sits inside the margin.
    pub fn set_left_margin(&mut self, margin: f64) {
        self.margins.left = margin;
        if !self.pages.is_empty() && self.x < margin {
            self.x = margin;
        }
    }

    pub fn set_top_margin(&mut self, margin: f64) {
        self.margins.top = margin;
    }

    pub fn set_right_margin(&mut self, margin: f64) {
        self.margins.right = margin;
    }

    /// Inner horizontal padding of cells.
    pub fn set_cell_margin(&mut self, margin: f64) {
        self.cell_margin = margin;
    }

    /// Enable or disable automatic page breaks, `margin` from the bottom edge.
    pub fn set_auto_page_break(&mut self, enabled: bool, margin: f64) {
        self.auto_page_break = enabled;
        self.margins.bottom = margin;
        self.page_break_trigger = self.h - margin;
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// A negative value is measured from the right edge.
    pub fn set_x(&mut self, x: f64) {
        self.x = if x >= 0.0 { x } else { self.w + x };
    }

    /// Also moves x back to the left margin. A negative value is measured
    /// from the bottom edge.
    pub fn set_y(&mut self, y: f64) {
        self.x = self.margins.left;
        self.y = if y >= 0.0 { y } else { self.h + y };
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.set_y(y);
        self.set_x(x);
    }

    /// Line break: back to the left margin and down by `h`, or by the height
    /// of the last cell.
    pub fn ln(&mut self, h: Option<f64>) {
        self.x = self.margins.left;
        self.y += h.unwrap_or(self.last_height);
    }

    /// Height of the last printed cell.
    pub fn last_height(&self) -> f64 {
        self.last_height
    }

    // Lifecycle

    pub fn open(&mut self) {
        if self.state == DocumentState::Unopened {
            self.state = DocumentState::Open;
        }
    }

    /// Start a new page with the default orientation and size.
    pub fn add_page(&mut self) -> Result<()> {
        self.start_page(None, None)
    }

    /// Start a new page, overriding the orientation and/or size.
    pub fn add_page_with(
        &mut self,
        orientation: Option<Orientation>,
        size: Option<PageSize>,
    ) -> Result<()> {
        self.start_page(orientation, size.map(|s| s.dimensions()))
    }

    fn start_page(
        &mut self,
        orientation: Option<Orientation>,
        size: Option<PageDimensions>,
    ) -> Result<()> {
        if self.state == DocumentState::Closed {
            return Err(PdfError::InvalidState(
                "cannot add a page to a closed document".to_string(),
            ));
        }
        self.open();

        let family = self.font_family;
        let style = if self.underline {
            self.font_style | FontStyle::UNDERLINE
        } else {
            self.font_style
        };
        let font_size = self.font_size_pt;
        let line_width = self.line_width;
        let draw_color = self.draw_color;
        let fill_color = self.fill_color;
        let text_color = self.text_color;
        let color_flag = self.color_flag;

        if self.state == DocumentState::PageActive {
            self.run_footer()?;
            self.end_page();
        }
        self.begin_page(orientation, size);

        self.out_str("2 J")?;
        self.line_width = line_width;
        self.out_str(&format!("{:.2} w", line_width * self.k))?;
        if let Some(family) = family {
            self.select_font(family, style, font_size)?;
        }
        self.draw_color = draw_color;
        if draw_color != Color::black() {
            self.out_str(&draw_color.stroke_operator())?;
        }
        self.fill_color = fill_color;
        if fill_color != Color::black() {
            self.out_str(&fill_color.fill_operator())?;
        }
        self.text_color = text_color;
        self.color_flag = color_flag;

        self.run_header()?;

        // Undo style changes made by the header
        if self.line_width != line_width {
            self.line_width = line_width;
            self.out_str(&format!("{:.2} w", line_width * self.k))?;
        }
        if let Some(family) = family {
            self.select_font(family, style, font_size)?;
        }
        if self.draw_color != draw_color {
            self.draw_color = draw_color;
            self.out_str(&draw_color.stroke_operator())?;
        }
        if self.fill_color != fill_color {
            self.fill_color = fill_color;
            self.out_str(&fill_color.fill_operator())?;
        }
        self.text_color = text_color;
        self.color_flag = color_flag;
        Ok(())
    }

    fn begin_page(&mut self, orientation: Option<Orientation>, size: Option<PageDimensions>) {
        let orientation = orientation.unwrap_or(self.default_orientation);
        let size = size.unwrap_or(self.default_size);
        if orientation != self.current_orientation || size != self.current_size {
            let (w_pt, h_pt) = size.oriented(orientation);
            self.w_pt = w_pt;
            self.h_pt = h_pt;
            self.w = w_pt / self.k;
            self.h = h_pt / self.k;
            self.page_break_trigger = self.h - self.margins.bottom;
            self.current_orientation = orientation;
            self.current_size = size;
        }

        let custom_size = orientation != self.default_orientation || size != self.default_size;
        self.pages
            .push(Page::new(self.w_pt, self.h_pt, custom_size));
        self.state = DocumentState::PageActive;
        self.x = self.margins.left;
        self.y = self.margins.top;
        self.font_family = None;
        debug!(
            "Began page {} ({:.2}x{:.2}pt)",
            self.pages.len(),
            self.w_pt,
            self.h_pt
        );
    }

    fn end_page(&mut self) {
        self.state = DocumentState::Open;
        debug!("Ended page {}", self.pages.len());
    }

    fn run_header(&mut self) -> Result<()> {
        if let Some(mut template) = self.template.take() {
            self.in_header = true;
            let result = template.header(self);
            self.in_header = false;
            if self.template.is_none() {
                self.template = Some(template);
            }
            result?;
        }
        Ok(())
    }

    fn run_footer(&mut self) -> Result<()> {
        if let Some(mut template) = self.template.take() {
            self.in_footer = true;
            let result = template.footer(self);
            self.in_footer = false;
            if self.template.is_none() {
                self.template = Some(template);
            }
            result?;
        }
        Ok(())
    }

    /// Finish the last page and serialize the document. Calling it again is
    /// a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.state == DocumentState::Closed {
            return Ok(());
        }
        if self.pages.is_empty() {
            self.add_page()?;
        }
        self.run_footer()?;
        self.end_page();

        let mut buffer = Vec::new();
        PdfWriter::new_with_writer(&mut buffer).write_document(self)?;
        debug!(
            "Serialized {} pages into {} bytes",
            self.pages.len(),
            buffer.len()
        );
        self.output = buffer;
        self.state = DocumentState::Closed;
        Ok(())
    }

    /// Close the document if needed and return the file contents.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.close()?;
        Ok(self.output.clone())
    }

    /// Close the document if needed and write it to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.close()?;
        std::fs::write(path.as_ref(), &self.output)?;
        debug!("Wrote {}", path.as_ref().display());
        Ok(())
    }

    // Content output

    /// Append one line of operators to the active page.
    pub(crate) fn out(&mut self, bytes: &[u8]) -> Result<()> {
        if self.state != DocumentState::PageActive {
            return Err(PdfError::InvalidState("no page is active".to_string()));
        }
        match self.pages.last_mut() {
            Some(page) => {
                page.append(bytes);
                Ok(())
            }
            None => Err(PdfError::InvalidState("no page is active".to_string())),
        }
    }

    pub(crate) fn out_str(&mut self, s: &str) -> Result<()> {
        self.out(s.as_bytes())
    }

    /// Style operators are only recorded while a page is active; otherwise
    /// they are replayed when the next page begins.
    fn out_if_active(&mut self, s: &str) {
        if self.state == DocumentState::PageActive {
            if let Some(page) = self.pages.last_mut() {
                page.append(s.as_bytes());
            }
        }
    }

    // Page breaks

    fn accept_page_break(&mut self) -> bool {
        match self.page_break_policy.take() {
            Some(mut policy) => {
                let accept = policy.accept_page_break(self);
                if self.page_break_policy.is_none() {
                    self.page_break_policy = Some(policy);
                }
                accept
            }
            None => true,
        }
    }

    fn needs_page_break(&mut self, height: f64) -> bool {
        self.y + height > self.page_break_trigger
            && !self.in_header
            && !self.in_footer
            && self.auto_page_break
            && self.accept_page_break()
    }

    /// Start a new page if content of `height` would cross the bottom
    /// margin. Keeps x and carries the word spacing over.
    pub(crate) fn check_page_break(&mut self, height: f64) -> Result<bool> {
        if !self.needs_page_break(height) {
            return Ok(false);
        }

        let x = self.x;
        let word_spacing = self.word_spacing;
        if word_spacing > 0.0 {
            self.word_spacing = 0.0;
            self.out_str("0 Tw")?;
        }
        self.start_page(Some(self.current_orientation), Some(self.current_size))?;
        self.x = x;
        if word_spacing > 0.0 {
            self.word_spacing = word_spacing;
            self.out_str(&format!("{:.3} Tw", word_spacing * self.k))?;
        }
        Ok(true)
    }

    // Style

    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
        self.out_if_active(&color.stroke_operator());
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
        self.color_flag = self.fill_color != self.text_color;
        self.out_if_active(&color.fill_operator());
    }

    /// Text color is applied per text operation, not emitted right away.
    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
        self.color_flag = self.fill_color != self.text_color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
        self.out_if_active(&format!("{:.2} w", width * self.k));
    }

    /// Select a core font. An empty `family` keeps the current family, a
    /// `size` of 0 keeps the current size. `style` is any combination of
    /// `B`, `I` and `U`.
    pub fn set_font(&mut self, family: &str, style: &str, size: f64) -> Result<()> {
        let family = if family.trim().is_empty() {
            self.font_family
                .ok_or_else(|| PdfError::FontError("No font family selected".to_string()))?
        } else {
            family.parse()?
        };
        let style: FontStyle = style.parse()?;
        self.select_font(family, style, size)
    }

    /// Typed form of [`set_font`](Document::set_font).
    pub fn set_font_face(&mut self, family: FontFamily, style: FontStyle, size: f64) -> Result<()> {
        self.select_font(family, style, size)
    }

    pub(crate) fn select_font(
        &mut self,
        family: FontFamily,
        style: FontStyle,
        size: f64,
    ) -> Result<()> {
        self.underline = style.contains(FontStyle::UNDERLINE);
        let key = FontKey::new(family, style);
        let size = if size == 0.0 { self.font_size_pt } else { size };

        if self.font_family == Some(family)
            && self.font_style == key.style()
            && self.font_size_pt == size
            && self.current_font.is_some()
        {
            return Ok(());
        }

        let index = self.resources.register_font(key)?;
        self.font_family = Some(family);
        self.font_style = key.style();
        self.font_size_pt = size;
        self.font_size = size / self.k;
        self.current_font = Some(index);
        if let Some(font) = self.resources.font(index) {
            let op = format!("BT /F{} {:.2} Tf ET", font.number(), size);
            self.out_if_active(&op);
        }
        Ok(())
    }

    /// Change the size of the current font, in points.
    pub fn set_font_size(&mut self, size: f64) {
        if self.font_size_pt == size {
            return;
        }
        self.font_size_pt = size;
        self.font_size = size / self.k;
        if let Some(number) = self
            .current_font
            .and_then(|index| self.resources.font(index))
            .map(|font| font.number())
        {
            self.out_if_active(&format!("BT /F{number} {size:.2} Tf ET"));
        }
    }

    /// Current font size in points.
    pub fn font_size_pt(&self) -> f64 {
        self.font_size_pt
    }

    /// Current font size in user units.
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub(crate) fn current_font_metrics(&self) -> Result<&'static CoreFont> {
        self.current_font
            .and_then(|index| self.resources.font(index))
            .map(|font| font.metrics())
            .ok_or_else(|| PdfError::FontError("No font has been set".to_string()))
    }

    /// Width of `text` in the current font, in user units.
    pub fn string_width(&self, text: &str) -> Result<f64> {
        let font = self.current_font_metrics()?;
        Ok(metrics::text_width(font, text, self.font_size))
    }

    // Drawing

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        let k = self.k;
        let h = self.h;
        self.out_str(&format!(
            "{:.2} {:.2} m {:.2} {:.2} l S",
            x1 * k,
            (h - y1) * k,
            x2 * k,
            (h - y2) * k
        ))
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: RectStyle) -> Result<()> {
        let k = self.k;
        self.out_str(&format!(
            "{:.2} {:.2} {:.2} {:.2} re {}",
            x * k,
            (self.h - y) * k,
            w * k,
            -h * k,
            style.operator()
        ))
    }

    /// Place an image.
    ///
    /// `x`/`y` default to the cursor; when `y` is `None` the image flows
    /// like text: it may start a new page and the cursor moves below it.
    /// A width and height of 0 size the image at 96 dpi, a negative value
    /// is a resolution in dpi, and a single 0 keeps the aspect ratio.
    pub fn image(
        &mut self,
        source: &ImageSource,
        x: Option<f64>,
        y: Option<f64>,
        w: f64,
        h: f64,
        link: Option<LinkTarget>,
    ) -> Result<()> {
        if self.state != DocumentState::PageActive {
            return Err(PdfError::InvalidState("no page is active".to_string()));
        }

        let key = source.key();
        let cached = self.resources.image(&key).map(|image| {
            (
                image.number(),
                image.resource().width(),
                image.resource().height(),
            )
        });
        let (number, width_px, height_px) = match cached {
            Some(info) => info,
            None => {
                let resource = source.load(self.jpeg_decoder.as_ref())?;
                if resource.soft_mask().is_some() && self.pdf_minor_version < 4 {
                    self.pdf_minor_version = 4;
                }
                let image = self.resources.add_image(key, resource);
                (
                    image.number(),
                    image.resource().width(),
                    image.resource().height(),
                )
            }
        };
        let (width_px, height_px) = (width_px as f64, height_px as f64);

        let (mut w, mut h) = if w == 0.0 && h == 0.0 {
            (-96.0, -96.0)
        } else {
            (w, h)
        };
        if w < 0.0 {
            w = -width_px * 72.0 / w / self.k;
        }
        if h < 0.0 {
            h = -height_px * 72.0 / h / self.k;
        }
        if w == 0.0 {
            w = h * width_px / height_px;
        }
        if h == 0.0 {
            h = w * height_px / width_px;
        }

        let y = match y {
            Some(y) => y,
            None => {
                self.check_page_break(h)?;
                let y = self.y;
                self.y += h;
                y
            }
        };
        let x = x.unwrap_or(self.x);

        let k = self.k;
        self.out_str(&format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /I{} Do Q",
            w * k,
            h * k,
            x * k,
            (self.h - (y + h)) * k,
            number
        ))?;
        if let Some(link) = link {
            self.link(x, y, w, h, link)?;
        }
        Ok(())
    }

    /// Page height in points for a 1-based page number.
    pub(crate) fn page_height_pt(&self, page: usize) -> Option<f64> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .map(Page::height)
    }

    /// Default page size in points, for the page tree.
    pub(crate) fn default_page_size_pt(&self) -> (f64, f64) {
        self.default_size.oriented(self.default_orientation)
    }

    pub(crate) fn warn_unset_links(&self) {
        let unset = self.links.iter().filter(|anchor| anchor.is_none()).count();
        if unset > 0 {
            warn!("{unset} internal link(s) have no destination");
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
