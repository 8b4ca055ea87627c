//! A tiny inline markup language on top of [`Document::write`].
//!
//! Recognized tags are `<b>`, `<i>`, `<u>`, `<a href="...">` and `<br>`, in
//! any case. Nested style tags are counted, so `<b>a<b>b</b>c</b>` stays
//! bold until the outer tag closes. Unknown tags are dropped; their text is
//! kept.

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::graphics::Color;
use crate::link::LinkTarget;
use crate::text::FontStyle;

/// Tags understood by [`Document::write_markup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupTag {
    Bold,
    Italic,
    Underline,
    Anchor,
    Break,
}

impl MarkupTag {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "B" => Some(MarkupTag::Bold),
            "I" => Some(MarkupTag::Italic),
            "U" => Some(MarkupTag::Underline),
            "A" => Some(MarkupTag::Anchor),
            "BR" => Some(MarkupTag::Break),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken<'a> {
    Text(&'a str),
    Open {
        tag: MarkupTag,
        href: Option<String>,
    },
    Close(MarkupTag),
}

/// Split markup into text runs and recognized tags.
pub fn tokenize(input: &str) -> Vec<MarkupToken<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let Some(open) = rest.find('<') else {
            tokens.push(MarkupToken::Text(rest));
            break;
        };
        let Some(close) = rest[open..].find('>').map(|pos| open + pos) else {
            // an unterminated tag is plain text
            tokens.push(MarkupToken::Text(rest));
            break;
        };

        if open > 0 {
            tokens.push(MarkupToken::Text(&rest[..open]));
        }
        if let Some(token) = parse_tag(&rest[open + 1..close]) {
            tokens.push(token);
        }
        rest = &rest[close + 1..];
    }

    tokens
}

fn parse_tag(inner: &str) -> Option<MarkupToken<'static>> {
    let inner = inner.trim();
    if let Some(name) = inner.strip_prefix('/') {
        return MarkupTag::from_name(name.trim()).map(MarkupToken::Close);
    }

    let (name, attributes) = match inner.find(char::is_whitespace) {
        Some(pos) => (&inner[..pos], &inner[pos..]),
        None => (inner.trim_end_matches('/'), ""),
    };
    let tag = MarkupTag::from_name(name)?;
    let href = if tag == MarkupTag::Anchor {
        attribute(attributes, "href")
    } else {
        None
    };
    Some(MarkupToken::Open { tag, href })
}

/// Value of `name=value`, `name="value"` or `name='value'`.
fn attribute(attributes: &str, name: &str) -> Option<String> {
    let mut rest = attributes.trim_start();
    while !rest.is_empty() {
        let eq = rest.find('=')?;
        let key = rest[..eq].trim();
        let value_start = rest[eq + 1..].trim_start();
        let (value, remaining) = match value_start.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &value_start[1..];
                let end = body.find(quote).unwrap_or(body.len());
                (&body[..end], body.get(end + 1..).unwrap_or(""))
            }
            _ => {
                let end = value_start
                    .find(char::is_whitespace)
                    .unwrap_or(value_start.len());
                (&value_start[..end], &value_start[end..])
            }
        };
        if key.eq_ignore_ascii_case(name) {
            return Some(value.to_string());
        }
        rest = remaining.trim_start();
    }
    None
}

#[derive(Debug, Default)]
struct MarkupStyle {
    bold: u32,
    italic: u32,
    underline: u32,
    href: Option<String>,
}

impl MarkupStyle {
    fn font_style(&self) -> FontStyle {
        let mut style = FontStyle::empty();
        if self.bold > 0 {
            style |= FontStyle::BOLD;
        }
        if self.italic > 0 {
            style |= FontStyle::ITALIC;
        }
        if self.underline > 0 {
            style |= FontStyle::UNDERLINE;
        }
        style
    }

    fn counter(&mut self, tag: MarkupTag) -> Option<&mut u32> {
        match tag {
            MarkupTag::Bold => Some(&mut self.bold),
            MarkupTag::Italic => Some(&mut self.italic),
            MarkupTag::Underline => Some(&mut self.underline),
            _ => None,
        }
    }
}

impl Document {
    /// Write flowing text with inline `<b>`, `<i>`, `<u>`, `<a href>` and
    /// `<br>` tags. Newlines in the source are treated as spaces; `<br>`
    /// breaks the line by `h`. Links are shown blue and underlined.
    pub fn write_markup(&mut self, h: f64, markup: &str) -> Result<()> {
        let family = self
            .font_family
            .ok_or_else(|| PdfError::FontError("No font has been set".to_string()))?;
        let text = markup.replace('\n', " ");
        let mut style = MarkupStyle::default();

        for token in tokenize(&text) {
            match token {
                MarkupToken::Text(run) => match style.href.clone() {
                    Some(href) => self.write_link(h, run, href, &mut style)?,
                    None => self.write(h, run, None)?,
                },
                MarkupToken::Open { tag, href } => match tag {
                    MarkupTag::Anchor => style.href = href,
                    MarkupTag::Break => self.ln(Some(h)),
                    _ => {
                        if let Some(count) = style.counter(tag) {
                            *count += 1;
                        }
                        self.select_font(family, style.font_style(), 0.0)?;
                    }
                },
                MarkupToken::Close(tag) => match tag {
                    MarkupTag::Anchor => style.href = None,
                    MarkupTag::Break => {}
                    _ => {
                        if let Some(count) = style.counter(tag) {
                            *count = count.saturating_sub(1);
                        }
                        self.select_font(family, style.font_style(), 0.0)?;
                    }
                },
            }
        }
        Ok(())
    }

    fn write_link(&mut self, h: f64, text: &str, href: String, style: &mut MarkupStyle) -> Result<()> {
        let family = self
            .font_family
            .ok_or_else(|| PdfError::FontError("No font has been set".to_string()))?;
        let text_color = self.text_color;

        self.set_text_color(Color::rgb8(0, 0, 255));
        style.underline += 1;
        self.select_font(family, style.font_style(), 0.0)?;
        self.write(h, text, Some(LinkTarget::Uri(href)))?;
        style.underline -= 1;
        self.select_font(family, style.font_style(), 0.0)?;
        self.set_text_color(text_color);
        Ok(())
    }
}
