//! Error types for bindery operations.

use thiserror::Error;

/// Errors that can occur while converting HTML content to a DOCX package.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid HTML: {0}")]
    InvalidHtml(String),

    /// The same bookmark name appeared twice in one document. The linkage
    /// target would be ambiguous, so the run is aborted.
    #[error("duplicate bookmark `{id}`")]
    DuplicateBookmark { id: String },

    /// Attachment was requested for a name the registry never saw. This is a
    /// defect in the conversion pass, not in the source content.
    #[error("bookmark `{id}` was never registered")]
    UnknownBookmark { id: String },

    /// A TOC entry references a bookmark that does not exist in the stream,
    /// or that no content fragment ever attached.
    #[error("unresolved bookmark `{id}` referenced by TOC entry `{entry}`")]
    UnresolvedBookmark { id: String, entry: String },
}

pub type Result<T> = std::result::Result<T, Error>;
