//! Error types for ingestion operations.

use thiserror::Error;

/// Errors that can occur while ingesting a book.
///
/// Structural failures (`InvalidArchive`, `InvalidEpub`, `DrmProtected`,
/// `EmptyExtraction`) abort the whole ingestion. `NotFound` is returned for
/// individual archive lookups and is absorbed by the chapter assembler, which
/// skips the affected spine entry instead of failing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid ePub: {0}")]
    InvalidEpub(String),

    #[error("the book is DRM-protected")]
    DrmProtected,

    #[error("could not extract text from ePub ({chars} usable characters)")]
    EmptyExtraction { chars: usize },

    #[error("file not found in archive: {0}")]
    NotFound(String),
}

impl Error {
    /// True for failures that callers should surface with a DRM-specific
    /// message instead of a generic "could not load" one.
    pub fn is_drm(&self) -> bool {
        matches!(self, Error::DrmProtected)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
