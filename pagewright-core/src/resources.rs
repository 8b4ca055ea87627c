//! Font and image registries shared by all pages of a document.
//!
//! Both registries are content-addressed: asking for a key that is already
//! present returns the existing entry. Entries are numbered from 1 in
//! registration order, which gives the `/F<n>` and `/I<n>` resource names.

use crate::error::Result;
use crate::graphics::{ImageKey, ImageResource};
use crate::text::{CoreFont, FontKey};
use std::collections::HashMap;
use tracing::debug;

/// A core font face used by the document
#[derive(Debug)]
pub struct FontResource {
    key: FontKey,
    number: usize,
    metrics: &'static CoreFont,
}

impl FontResource {
    pub fn key(&self) -> FontKey {
        self.key
    }

    /// Resource number, as in `/F1`.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn metrics(&self) -> &'static CoreFont {
        self.metrics
    }
}

/// A decoded image placed at least once in the document
#[derive(Debug)]
pub struct RegisteredImage {
    number: usize,
    resource: ImageResource,
}

impl RegisteredImage {
    /// Resource number, as in `/I1`.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn resource(&self) -> &ImageResource {
        &self.resource
    }
}

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    fonts: Vec<FontResource>,
    font_index: HashMap<FontKey, usize>,
    images: Vec<RegisteredImage>,
    image_index: HashMap<ImageKey, usize>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a core font face, returning its position in [`fonts`](Self::fonts).
    pub fn register_font(&mut self, key: FontKey) -> Result<usize> {
        if let Some(&index) = self.font_index.get(&key) {
            return Ok(index);
        }

        let metrics = CoreFont::lookup(&key)?;
        let index = self.fonts.len();
        self.fonts.push(FontResource {
            key,
            number: index + 1,
            metrics,
        });
        self.font_index.insert(key, index);
        debug!("Registered font {} as /F{}", metrics.name, index + 1);
        Ok(index)
    }

    pub fn font(&self, index: usize) -> Option<&FontResource> {
        self.fonts.get(index)
    }

    pub fn fonts(&self) -> &[FontResource] {
        &self.fonts
    }

    pub fn image(&self, key: &ImageKey) -> Option<&RegisteredImage> {
        self.image_index.get(key).map(|&index| &self.images[index])
    }

    /// Store a decoded image under `key`. An image already registered under
    /// the same key is kept and returned unchanged.
    pub fn add_image(&mut self, key: ImageKey, resource: ImageResource) -> &RegisteredImage {
        let index = match self.image_index.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.images.len();
                debug!(
                    "Registered {}x{} image as /I{}",
                    resource.width(),
                    resource.height(),
                    index + 1
                );
                self.images.push(RegisteredImage {
                    number: index + 1,
                    resource,
                });
                self.image_index.insert(key, index);
                index
            }
        };
        &self.images[index]
    }

    pub fn images(&self) -> &[RegisteredImage] {
        &self.images
    }
}
