use crate::compression;
use crate::document::{Document, PageLayout, Zoom};
use crate::error::{PdfError, Result};
use crate::graphics::{ImageColorSpace, ImageResource};
use crate::link::{LinkTarget, PageLink};
use crate::objects::{Dictionary, Object, ObjectId};
use crate::text::encoding;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, trace};

/// The page tree root and the shared resource dictionary are numbered
/// before anything is written; pages follow from 3.
const PAGES_ID: ObjectId = ObjectId::new(1, 0);
const RESOURCES_ID: ObjectId = ObjectId::new(2, 0);

/// Writes a document as a PDF file: numbered objects, each offset recorded
/// once, followed by the cross-reference table and trailer.
pub struct PdfWriter<W: Write> {
    writer: W,
    xref_positions: BTreeMap<u32, u64>,
    current_position: u64,
    /// Highest object number handed out so far
    object_count: u32,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self {
            writer,
            xref_positions: BTreeMap::new(),
            current_position: 0,
            object_count: 2,
        }
    }

    pub fn object_count(&self) -> u32 {
        self.object_count
    }

    /// The id the next [`put_object`](Self::put_object) call will use.
    pub fn next_id(&self) -> ObjectId {
        ObjectId::new(self.object_count + 1, 0)
    }

    pub fn write_document(&mut self, document: &Document) -> Result<()> {
        document.warn_unset_links();
        self.write_header(document)?;

        self.write_pages(document)?;
        self.write_resources(document)?;
        let info_id = self.write_info(document)?;
        let catalog_id = self.write_catalog(document)?;

        let xref_position = self.current_position;
        self.write_xref()?;
        self.write_trailer(catalog_id, info_id, xref_position)?;

        self.writer.flush()?;
        debug!(
            "Wrote {} objects, {} bytes",
            self.object_count, self.current_position
        );
        Ok(())
    }

    fn write_header(&mut self, document: &Document) -> Result<()> {
        self.write_bytes(format!("%PDF-{}\n", document.pdf_version()).as_bytes())?;
        // Binary comment to ensure file is treated as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_pages(&mut self, document: &Document) -> Result<()> {
        let page_count = document.pages.len();
        let alias = document
            .alias
            .as_ref()
            .map(|alias| (alias.as_bytes(), page_count.to_string()));
        let transparency = document.pdf_minor_version > 3;

        let mut kids = Vec::with_capacity(page_count);
        for page in &document.pages {
            let page_id = self.next_id();
            let content_id = ObjectId::new(page_id.number() + 1, 0);

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::name("Page"));
            page_dict.set("Parent", PAGES_ID);
            if page.custom_size {
                page_dict.set("MediaBox", media_box(page.width(), page.height()));
            }
            page_dict.set("Resources", RESOURCES_ID);
            if !page.links.is_empty() {
                let annots = page
                    .links
                    .iter()
                    .map(|link| annotation(document, link).map(Object::Dictionary))
                    .collect::<Result<Vec<_>>>()?;
                page_dict.set("Annots", Object::Array(annots));
            }
            if transparency {
                let mut group = Dictionary::new();
                group.set("Type", Object::name("Group"));
                group.set("S", Object::name("Transparency"));
                group.set("CS", Object::name("DeviceRGB"));
                page_dict.set("Group", group);
            }
            page_dict.set("Contents", content_id);
            self.put_object(&Object::Dictionary(page_dict))?;

            let content = match &alias {
                Some((alias, count)) => replace_all(page.content(), alias, count.as_bytes()),
                None => page.content().to_vec(),
            };
            let written = self.put_stream(Dictionary::new(), &content, document.compress)?;
            if written != content_id {
                return Err(PdfError::InvalidReference(format!(
                    "content stream of page {} written as {}",
                    page_id, written
                )));
            }
            kids.push(Object::Reference(page_id));
        }

        let (width, height) = document.default_page_size_pt();
        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::name("Pages"));
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", page_count);
        pages_dict.set("MediaBox", media_box(width, height));
        self.write_object(PAGES_ID, &Object::Dictionary(pages_dict))
    }

    /// Fonts, images, then the resource dictionary that names them.
    fn write_resources(&mut self, document: &Document) -> Result<()> {
        let mut fonts = Dictionary::new();
        for font in document.resources.fonts() {
            let metrics = font.metrics();
            let mut dict = Dictionary::new();
            dict.set("Type", Object::name("Font"));
            dict.set("BaseFont", Object::name(metrics.name));
            dict.set("Subtype", Object::name("Type1"));
            if metrics.uses_win_ansi() {
                dict.set("Encoding", Object::name("WinAnsiEncoding"));
            }
            let id = self.put_object(&Object::Dictionary(dict))?;
            fonts.set(format!("F{}", font.number()), id);
        }

        let mut xobjects = Dictionary::new();
        for image in document.resources.images() {
            let id = self.write_image(image.resource(), document.compress)?;
            xobjects.set(format!("I{}", image.number()), id);
        }

        let mut resources = Dictionary::new();
        resources.set(
            "ProcSet",
            Object::Array(
                ["PDF", "Text", "ImageB", "ImageC", "ImageI"]
                    .into_iter()
                    .map(Object::name)
                    .collect(),
            ),
        );
        resources.set("Font", fonts);
        resources.set("XObject", xobjects);
        self.write_object(RESOURCES_ID, &Object::Dictionary(resources))
    }

    /// An image XObject, directly followed by its soft mask and palette.
    fn write_image(&mut self, image: &ImageResource, compress: bool) -> Result<ObjectId> {
        let image_id = self.next_id();
        let mut next = image_id.number() + 1;
        let soft_mask_id = image.soft_mask().map(|_| {
            let id = ObjectId::new(next, 0);
            next += 1;
            id
        });
        let palette_id =
            (image.color_space() == ImageColorSpace::Indexed).then(|| ObjectId::new(next, 0));

        let dict = image.to_dictionary(soft_mask_id, palette_id)?;
        self.put_stream(dict, image.data(), false)?;

        if let (Some(mask), Some(expected)) = (image.soft_mask(), soft_mask_id) {
            let written = self.write_image(mask, compress)?;
            check_id(expected, written, "soft mask")?;
        }
        if let Some(expected) = palette_id {
            let written = self.put_stream(Dictionary::new(), image.palette(), compress)?;
            check_id(expected, written, "palette")?;
        }
        Ok(image_id)
    }

    fn write_info(&mut self, document: &Document) -> Result<ObjectId> {
        let metadata = &document.metadata;
        let mut info_dict = Dictionary::new();

        info_dict.set(
            "Producer",
            Object::String(format!("pagewright {}", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(ref title) = metadata.title {
            info_dict.set("Title", Object::String(title.clone()));
        }
        if let Some(ref subject) = metadata.subject {
            info_dict.set("Subject", Object::String(subject.clone()));
        }
        if let Some(ref author) = metadata.author {
            info_dict.set("Author", Object::String(author.clone()));
        }
        if let Some(ref keywords) = metadata.keywords {
            info_dict.set("Keywords", Object::String(keywords.clone()));
        }
        if let Some(ref creator) = metadata.creator {
            info_dict.set("Creator", Object::String(creator.clone()));
        }
        let creation_date = metadata.creation_date.unwrap_or_else(Utc::now);
        info_dict.set("CreationDate", Object::String(format_pdf_date(creation_date)));

        self.put_object(&Object::Dictionary(info_dict))
    }

    fn write_catalog(&mut self, document: &Document) -> Result<ObjectId> {
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::name("Catalog"));
        catalog.set("Pages", PAGES_ID);

        let first_page = Object::Reference(ObjectId::new(3, 0));
        let open_action = match document.zoom {
            Zoom::Default => None,
            Zoom::FullPage => Some(vec![first_page, Object::name("Fit")]),
            Zoom::FullWidth => Some(vec![first_page, Object::name("FitH"), Object::Null]),
            Zoom::Real => Some(vec![
                first_page,
                Object::name("XYZ"),
                Object::Null,
                Object::Null,
                Object::Integer(1),
            ]),
            Zoom::Percent(zoom) => Some(vec![
                first_page,
                Object::name("XYZ"),
                Object::Null,
                Object::Null,
                Object::Real(zoom / 100.0),
            ]),
        };
        if let Some(action) = open_action {
            catalog.set("OpenAction", Object::Array(action));
        }

        let layout = match document.layout {
            PageLayout::Default => None,
            PageLayout::Single => Some("SinglePage"),
            PageLayout::Continuous => Some("OneColumn"),
            PageLayout::Two => Some("TwoColumnLeft"),
        };
        if let Some(layout) = layout {
            catalog.set("PageLayout", Object::name(layout));
        }

        self.put_object(&Object::Dictionary(catalog))
    }
}

impl<W: Write> PdfWriter<W> {
    /// Write `object` under the next free id.
    pub fn put_object(&mut self, object: &Object) -> Result<ObjectId> {
        let id = self.next_id();
        self.object_count = id.number();
        self.write_object(id, object)?;
        Ok(id)
    }

    /// Write a stream under the next free id, deflating it first when
    /// `compress` is set. `/Length` is filled in.
    pub fn put_stream(
        &mut self,
        mut dict: Dictionary,
        data: &[u8],
        compress: bool,
    ) -> Result<ObjectId> {
        let id = self.next_id();
        self.object_count = id.number();

        let compressed;
        let data = if compress {
            compressed = compression::compress(data)?;
            dict.set("Filter", Object::name("FlateDecode"));
            compressed.as_slice()
        } else {
            data
        };
        dict.set("Length", data.len());

        self.begin_object(id)?;
        self.write_object_value(&Object::Dictionary(dict))?;
        self.write_stream_body(data)?;
        self.write_bytes(b"\nendobj\n")?;
        Ok(id)
    }

    /// Write `object` under an id reserved up front.
    pub fn write_object(&mut self, id: ObjectId, object: &Object) -> Result<()> {
        self.begin_object(id)?;
        self.write_object_value(object)?;
        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn begin_object(&mut self, id: ObjectId) -> Result<()> {
        if self.xref_positions.contains_key(&id.number()) {
            return Err(PdfError::InvalidReference(format!(
                "object {} written twice",
                id.number()
            )));
        }
        if id.number() > self.object_count {
            return Err(PdfError::InvalidReference(format!(
                "object {} was never allocated",
                id.number()
            )));
        }
        trace!("object {} at offset {}", id.number(), self.current_position);
        self.xref_positions.insert(id.number(), self.current_position);

        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())
    }

    fn write_stream_body(&mut self, data: &[u8]) -> Result<()> {
        self.write_bytes(b"\nstream\n")?;
        self.write_bytes(data)?;
        self.write_bytes(b"\nendstream")
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(format!("{f:.2}").as_bytes())?,
            Object::String(s) => {
                self.write_bytes(b"(")?;
                self.write_bytes(&encoding::literal(s))?;
                self.write_bytes(b")")?;
            }
            Object::Name(n) => {
                self.write_bytes(b"/")?;
                self.write_bytes(n.as_bytes())?;
            }
            Object::Array(arr) => {
                self.write_bytes(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object_value(obj)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => {
                self.write_bytes(b"<<")?;
                for (key, value) in dict.entries() {
                    self.write_bytes(b"\n/")?;
                    self.write_bytes(key.as_bytes())?;
                    self.write_bytes(b" ")?;
                    self.write_object_value(value)?;
                }
                self.write_bytes(b"\n>>")?;
            }
            Object::Reference(id) => {
                let ref_str = format!("{} {} R", id.number(), id.generation());
                self.write_bytes(ref_str.as_bytes())?;
            }
        }
        Ok(())
    }

    fn write_xref(&mut self) -> Result<()> {
        self.write_bytes(b"xref\n")?;
        self.write_bytes(format!("0 {}\n", self.object_count + 1).as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;

        for number in 1..=self.object_count {
            let position = *self.xref_positions.get(&number).ok_or_else(|| {
                PdfError::InvalidReference(format!("object {number} was never written"))
            })?;
            let entry = format!("{:010} {:05} n \n", position, 0);
            self.write_bytes(entry.as_bytes())?;
        }

        Ok(())
    }

    fn write_trailer(
        &mut self,
        catalog_id: ObjectId,
        info_id: ObjectId,
        xref_position: u64,
    ) -> Result<()> {
        let mut trailer = Dictionary::new();
        trailer.set("Size", Object::Integer(self.object_count as i64 + 1));
        trailer.set("Root", Object::Reference(catalog_id));
        trailer.set("Info", Object::Reference(info_id));

        self.write_bytes(b"trailer\n")?;
        self.write_object_value(&Object::Dictionary(trailer))?;
        self.write_bytes(b"\nstartxref\n")?;
        self.write_bytes(xref_position.to_string().as_bytes())?;
        self.write_bytes(b"\n%%EOF\n")?;

        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

fn check_id(expected: ObjectId, written: ObjectId, what: &str) -> Result<()> {
    if expected == written {
        Ok(())
    } else {
        Err(PdfError::InvalidReference(format!(
            "{what} expected as {expected}, written as {written}"
        )))
    }
}

fn media_box(width: f64, height: f64) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(width),
        Object::Real(height),
    ])
}

/// Link annotation for a page region. Internal targets resolve to the
/// object id of the destination page.
fn annotation(document: &Document, link: &PageLink) -> Result<Dictionary> {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::name("Annot"));
    dict.set("Subtype", Object::name("Link"));
    dict.set(
        "Rect",
        Object::Array(vec![
            Object::Real(link.x),
            Object::Real(link.y),
            Object::Real(link.x + link.width),
            Object::Real(link.y - link.height),
        ]),
    );
    dict.set("Border", Object::Array(vec![Object::Integer(0); 3]));

    match &link.target {
        LinkTarget::Uri(uri) => {
            let mut action = Dictionary::new();
            action.set("S", Object::name("URI"));
            action.set("URI", Object::String(uri.clone()));
            dict.set("A", action);
        }
        LinkTarget::Internal(id) => {
            let anchor = document.link_anchor(*id).ok_or_else(|| {
                PdfError::InvalidLink(format!("internal link {} has no destination", id.0))
            })?;
            let height = document.page_height_pt(anchor.page).ok_or_else(|| {
                PdfError::InvalidLink(format!(
                    "internal link {} points to missing page {}",
                    id.0, anchor.page
                ))
            })?;
            let page_id = ObjectId::new(1 + 2 * anchor.page as u32, 0);
            dict.set(
                "Dest",
                Object::Array(vec![
                    Object::Reference(page_id),
                    Object::name("XYZ"),
                    Object::Integer(0),
                    Object::Real(height - anchor.y * document.k),
                    Object::Null,
                ]),
            );
        }
    }
    Ok(dict)
}

/// Replace every occurrence of `from` in `haystack`.
fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

/// Format a DateTime as a PDF date string (D:YYYYMMDDHHmmSSOHH'mm)
fn format_pdf_date(date: DateTime<Utc>) -> String {
    let formatted = date.format("D:%Y%m%d%H%M%S");

    // For UTC, the offset is always +00'00
    format!("{formatted}+00'00")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentConfig;
    use crate::page::Unit;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn render(doc: &mut Document) -> String {
        String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned()
    }

    fn uncompressed() -> Document {
        Document::with_config(DocumentConfig {
            unit: Unit::Point,
            compress: false,
            ..DocumentConfig::default()
        })
    }

    #[test]
    fn test_pdf_writer_new_with_writer() {
        let writer = PdfWriter::new_with_writer(Vec::new());
        assert_eq!(writer.current_position, 0);
        assert!(writer.xref_positions.is_empty());
        assert_eq!(writer.next_id(), ObjectId::new(3, 0));
    }

    #[test]
    fn test_write_header() {
        let mut buffer = Vec::new();
        let doc = Document::new();
        let mut writer = PdfWriter::new_with_writer(&mut buffer);

        writer.write_header(&doc).unwrap();

        assert!(buffer.starts_with(b"%PDF-1.3\n"));
        assert_eq!(buffer.len(), 15);
        assert_eq!(buffer[9], b'%');
        assert_eq!(buffer[14], b'\n');
    }

    #[test]
    fn test_put_object_numbers_sequentially() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new_with_writer(&mut buffer);

        let a = writer.put_object(&Object::Integer(1)).unwrap();
        let b = writer.put_object(&Object::Integer(2)).unwrap();
        assert_eq!(a.number(), 3);
        assert_eq!(b.number(), 4);
        assert_eq!(writer.object_count(), 4);
        drop(writer);

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "3 0 obj\n1\nendobj\n4 0 obj\n2\nendobj\n"
        );
    }

    #[test]
    fn test_duplicate_and_unallocated_ids_are_rejected() {
        let mut writer = PdfWriter::new_with_writer(Vec::new());
        writer.write_object(PAGES_ID, &Object::Null).unwrap();
        assert!(matches!(
            writer.write_object(PAGES_ID, &Object::Null),
            Err(PdfError::InvalidReference(_))
        ));
        assert!(matches!(
            writer.write_object(ObjectId::new(9, 0), &Object::Null),
            Err(PdfError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_xref_requires_every_object() {
        let mut writer = PdfWriter::new_with_writer(Vec::new());
        writer.write_object(PAGES_ID, &Object::Null).unwrap();
        // object 2 never written
        assert!(matches!(
            writer.write_xref(),
            Err(PdfError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_put_stream_sets_length() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new_with_writer(&mut buffer);
        writer
            .put_stream(Dictionary::new(), b"0 0 m 10 10 l S", false)
            .unwrap();
        drop(writer);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "3 0 obj\n<<\n/Length 15\n>>\nstream\n0 0 m 10 10 l S\nendstream\nendobj\n"
        );
    }

    #[test]
    fn test_put_stream_compresses() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new_with_writer(&mut buffer);
        let data = b"BT /F1 12.00 Tf ET\n".repeat(20);
        writer.put_stream(Dictionary::new(), &data, true).unwrap();
        drop(writer);

        let start = buffer.windows(8).position(|w| w == b"stream\n\x78").unwrap() + 7;
        let end = buffer.windows(10).position(|w| w == b"\nendstream").unwrap();
        let body = &buffer[start..end];
        assert_eq!(compression::decompress(body).unwrap(), data);

        let text = String::from_utf8_lossy(&buffer);
        assert!(text.contains("/Filter /FlateDecode"));
        assert!(text.contains(&format!("/Length {}", body.len())));
    }

    #[test]
    fn test_write_object_values() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new_with_writer(&mut buffer);
        let mut dict = Dictionary::new();
        dict.set("A", Object::Array(vec![Object::Real(1.0 / 3.0), Object::Null]));
        dict.set("S", Object::String("(x)".to_string()));
        dict.set("R", ObjectId::new(5, 0));
        dict.set("N", Object::name("XObject"));
        dict.set("I", -7);
        writer
            .write_object_value(&Object::Dictionary(dict))
            .unwrap();
        drop(writer);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "<<\n/A [0.33 null]\n/S (\\(x\\))\n/R 5 0 R\n/N /XObject\n/I -7\n>>"
        );
    }

    #[test]
    fn test_format_pdf_date() {
        let date = Utc.with_ymd_and_hms(2023, 12, 25, 15, 30, 45).unwrap();
        assert_eq!(format_pdf_date(date), "D:20231225153045+00'00");
    }

    #[test]
    fn test_replace_all() {
        assert_eq!(replace_all(b"Page 1/{nb}", b"{nb}", b"12"), b"Page 1/12");
        assert_eq!(replace_all(b"{nb}{nb}", b"{nb}", b"3"), b"33");
        assert_eq!(replace_all(b"abc", b"", b"x"), b"abc");
    }

    fn position(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .position(|window| window == needle.as_bytes())
            .unwrap_or_else(|| panic!("{needle:?} not found"))
    }

    #[test]
    fn test_minimal_document_layout() {
        let mut doc = uncompressed();
        doc.set_creation_date(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        let bytes = doc.to_bytes().unwrap();
        let pdf = String::from_utf8_lossy(&bytes);

        let page = position(&bytes, "3 0 obj\n<<\n/Type /Page\n");
        let content = position(&bytes, "4 0 obj");
        let pages = position(&bytes, "1 0 obj\n<<\n/Type /Pages\n");
        let resources = position(&bytes, "2 0 obj\n<<\n/ProcSet");
        let info = position(&bytes, "5 0 obj\n<<\n/Producer");
        let catalog = position(&bytes, "6 0 obj\n<<\n/Type /Catalog");
        let xref = position(&bytes, "xref\n0 7\n");
        assert!(page < content && content < pages && pages < resources);
        assert!(resources < info && info < catalog && catalog < xref);

        assert!(pdf.contains("/Kids [3 0 R]\n/Count 1\n/MediaBox [0 0 595.28 841.89]"));
        assert!(pdf.contains("/CreationDate (D:20240102030405+00'00)"));
        assert!(pdf.contains(&format!("startxref\n{xref}\n%%EOF\n")));
        assert!(pdf.contains("/Size 7\n/Root 6 0 R\n/Info 5 0 R"));
        // default-sized pages inherit the MediaBox
        assert!(!String::from_utf8_lossy(&bytes[page..content]).contains("MediaBox"));
    }

    #[test]
    fn test_alias_is_replaced_in_every_page() {
        let mut doc = uncompressed();
        doc.alias_page_count("{nb}");
        doc.set_font("Helvetica", "", 10.0).unwrap();
        for _ in 0..3 {
            doc.add_page().unwrap();
            doc.text(10.0, 10.0, "of {nb}").unwrap();
        }
        let pdf = render(&mut doc);
        assert_eq!(pdf.matches("(of 3) Tj").count(), 3);
        assert!(!pdf.contains("{nb}"));
    }

    #[test]
    fn test_display_mode_in_catalog() {
        let mut doc = uncompressed();
        doc.set_display_mode(Zoom::FullWidth, PageLayout::Two);
        let pdf = render(&mut doc);
        assert!(pdf.contains("/OpenAction [3 0 R /FitH null]"));
        assert!(pdf.contains("/PageLayout /TwoColumnLeft"));

        let mut doc = uncompressed();
        doc.set_display_mode(Zoom::Percent(150.0), PageLayout::Continuous);
        let pdf = render(&mut doc);
        assert!(pdf.contains("/OpenAction [3 0 R /XYZ null null 1.50]"));
        assert!(pdf.contains("/PageLayout /OneColumn"));
    }

    #[test]
    fn test_metadata_in_info() {
        let mut doc = uncompressed();
        doc.set_title("Report (draft)");
        doc.set_author("Jules Verne");
        doc.set_subject("Travel");
        doc.set_keywords("sea, balloon");
        doc.set_creator("tests");
        let pdf = render(&mut doc);
        assert!(pdf.contains("/Title (Report \\(draft\\))"));
        assert!(pdf.contains("/Author (Jules Verne)"));
        assert!(pdf.contains("/Subject (Travel)"));
        assert!(pdf.contains("/Keywords (sea, balloon)"));
        assert!(pdf.contains("/Creator (tests)"));
        assert!(pdf.contains(&format!("/Producer (pagewright {})", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn test_custom_page_gets_media_box() {
        let mut doc = uncompressed();
        doc.add_page_with(Some(crate::page::Orientation::Landscape), None)
            .unwrap();
        let pdf = render(&mut doc);
        assert!(pdf.contains("/Parent 1 0 R\n/MediaBox [0 0 841.89 595.28]\n/Resources 2 0 R"));
    }

    #[test]
    fn test_font_objects() {
        let mut doc = uncompressed();
        doc.add_page().unwrap();
        doc.set_font("Times", "B", 10.0).unwrap();
        doc.set_font("Symbol", "", 10.0).unwrap();
        let pdf = render(&mut doc);
        assert!(pdf.contains(
            "<<\n/Type /Font\n/BaseFont /Times-Bold\n/Subtype /Type1\n/Encoding /WinAnsiEncoding\n>>"
        ));
        assert!(pdf.contains("<<\n/Type /Font\n/BaseFont /Symbol\n/Subtype /Type1\n>>"));
        assert!(pdf.contains("/Font <<\n/F1 5 0 R\n/F2 6 0 R\n>>"));
    }

    #[test]
    fn test_links_become_annotations() {
        let mut doc = uncompressed();
        doc.add_page().unwrap();
        let target = doc.add_link();
        doc.link(10.0, 20.0, 30.0, 5.0, "https://example.com".into())
            .unwrap();
        doc.link(10.0, 40.0, 30.0, 5.0, target.into()).unwrap();
        doc.add_page().unwrap();
        doc.set_link(target, Some(100.0), None).unwrap();

        let pdf = render(&mut doc);
        assert!(pdf.contains("/Rect [10.00 821.89 40.00 816.89]"));
        assert!(pdf.contains("/Border [0 0 0]"));
        assert!(pdf.contains("/A <<\n/S /URI\n/URI (https://example.com)\n>>"));
        assert!(pdf.contains("/Dest [5 0 R /XYZ 0 741.89 null]"));
    }

    #[test]
    fn test_unset_internal_link_fails() {
        let mut doc = uncompressed();
        doc.add_page().unwrap();
        let target = doc.add_link();
        doc.link(0.0, 0.0, 10.0, 10.0, target.into()).unwrap();
        assert!(matches!(doc.close(), Err(PdfError::InvalidLink(_))));
    }
}
