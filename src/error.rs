//! Error types for bookweave operations.

use thiserror::Error;

/// Errors that can occur while configuring extraction, crawling pages or
/// writing an ebook.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("page not found: {url} (status {status:03})")]
    PageNotFound { url: String, status: u16 },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("heading level must be >= 1 and <= 6, got {0}")]
    InvalidHeadingLevel(u8),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("unsupported media type for {0}")]
    UnsupportedMediaType(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
