//! Conversion errors.
//!
//! Unsupported file types are not errors: the dispatcher answers them with
//! a Markdown stub. Everything here is a real failure that the caller has
//! to present to the user.

use thiserror::Error;

/// Errors raised while fetching or converting a document.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("fetch of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid OOXML archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document part missing: {0}")]
    MissingPart(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
