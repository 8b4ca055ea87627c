use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Invalid object reference: {0}")]
    InvalidReference(String),

    #[error("Invalid document state: {0}")]
    InvalidState(String),

    #[error("Invalid link: {0}")]
    InvalidLink(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
