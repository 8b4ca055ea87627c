//! Colors and raster images.

mod color;
mod image;
mod jpeg;
mod png;

pub use color::Color;
pub use image::{ImageColorSpace, ImageFilter, ImageResource, PredictorParams};
#[cfg(feature = "external-images")]
pub use jpeg::ImageCrateDecoder;
pub use jpeg::{default_decoder, JpegDecoder, JpegInfo, MarkerScanDecoder};
pub use png::parse_png;

#[cfg(test)]
pub(crate) use jpeg::tests::minimal_jpeg;
#[cfg(test)]
pub(crate) use png::tests::build_png;

use crate::error::{PdfError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Png,
    Jpeg,
}

impl ImageType {
    /// Guess the format from a file extension (`png`, `jpg`, `jpeg`).
    pub fn from_extension(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                PdfError::UnsupportedImage(format!(
                    "Image file has no extension and no type was specified: {}",
                    path.display()
                ))
            })?;
        match ext.as_str() {
            "png" => Ok(ImageType::Png),
            "jpg" | "jpeg" => Ok(ImageType::Jpeg),
            other => Err(PdfError::UnsupportedImage(format!(
                "Unsupported image type: {other}"
            ))),
        }
    }
}

/// Where an image comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on disk, typed by extension unless `kind` is given
    Path {
        path: PathBuf,
        kind: Option<ImageType>,
    },
    /// In-memory encoded bytes
    Bytes { data: Vec<u8>, kind: ImageType },
}

impl ImageSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path {
            path: path.into(),
            kind: None,
        }
    }

    pub fn path_with_type(path: impl Into<PathBuf>, kind: ImageType) -> Self {
        ImageSource::Path {
            path: path.into(),
            kind: Some(kind),
        }
    }

    pub fn bytes(data: impl Into<Vec<u8>>, kind: ImageType) -> Self {
        ImageSource::Bytes {
            data: data.into(),
            kind,
        }
    }

    /// Cache identity: the path for files, a SHA-256 digest for byte sources.
    pub fn key(&self) -> ImageKey {
        match self {
            ImageSource::Path { path, .. } => ImageKey::Path(path.clone()),
            ImageSource::Bytes { data, .. } => {
                let mut digest = [0u8; 32];
                digest.copy_from_slice(&Sha256::digest(data));
                ImageKey::Digest(digest)
            }
        }
    }

    /// Read and decode the source.
    pub fn load(&self, jpeg_decoder: &dyn JpegDecoder) -> Result<ImageResource> {
        let (data, kind) = match self {
            ImageSource::Path { path, kind } => {
                let kind = match kind {
                    Some(kind) => *kind,
                    None => ImageType::from_extension(path)?,
                };
                (std::fs::read(path)?, kind)
            }
            ImageSource::Bytes { data, kind } => (data.clone(), *kind),
        };

        match kind {
            ImageType::Png => parse_png(&data),
            ImageType::Jpeg => jpeg::load_jpeg(jpeg_decoder, data),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::path(path)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::path(path)
    }
}

/// Identity under which a decoded image is cached in a document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageKey {
    Path(PathBuf),
    Digest([u8; 32]),
}
