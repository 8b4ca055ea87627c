//! Hyperlinks: outbound URIs and internal anchors.

use crate::document::Document;
use crate::error::{PdfError, Result};
use tracing::warn;

/// Handle to an internal link created by [`Document::add_link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub(crate) usize);

/// What a clickable region points at
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    Uri(String),
    Internal(LinkId),
}

impl From<LinkId> for LinkTarget {
    fn from(id: LinkId) -> Self {
        LinkTarget::Internal(id)
    }
}

impl From<&str> for LinkTarget {
    fn from(uri: &str) -> Self {
        LinkTarget::Uri(uri.to_string())
    }
}

impl From<String> for LinkTarget {
    fn from(uri: String) -> Self {
        LinkTarget::Uri(uri)
    }
}

/// Where an internal link lands: a 1-based page number and a y position in
/// user units from the top of that page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkAnchor {
    pub page: usize,
    pub y: f64,
}

/// A clickable rectangle on a page, in points with the origin at the bottom
/// left. `y` is the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub target: LinkTarget,
}

impl Document {
    /// Create a new internal link. Its destination is set later with
    /// [`Document::set_link`].
    pub fn add_link(&mut self) -> LinkId {
        self.links.push(None);
        LinkId(self.links.len() - 1)
    }

    /// Point an internal link at a position. `y` defaults to the current
    /// cursor and `page` to the current page.
    pub fn set_link(&mut self, id: LinkId, y: Option<f64>, page: Option<usize>) -> Result<()> {
        let anchor = LinkAnchor {
            page: page.unwrap_or_else(|| self.page_no()),
            y: y.unwrap_or(self.y),
        };
        if anchor.page == 0 {
            warn!("link {} anchored before any page exists", id.0);
        }
        let slot = self
            .links
            .get_mut(id.0)
            .ok_or_else(|| PdfError::InvalidLink(format!("unknown link id {}", id.0)))?;
        *slot = Some(anchor);
        Ok(())
    }

    /// Make the rectangle at (x, y) of size w × h on the current page
    /// clickable.
    pub fn link(&mut self, x: f64, y: f64, w: f64, h: f64, target: LinkTarget) -> Result<()> {
        let k = self.k;
        let page_height = self.h;
        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| PdfError::InvalidState("no page has been added".to_string()))?;
        page.links.push(PageLink {
            x: x * k,
            y: (page_height - y) * k,
            width: w * k,
            height: h * k,
            target,
        });
        Ok(())
    }

    /// The destination of an internal link, if set.
    pub fn link_anchor(&self, id: LinkId) -> Option<LinkAnchor> {
        self.links.get(id.0).copied().flatten()
    }
}
