//! Error types for loading score documents.
//!
//! Only structural failures are errors. Missing or malformed fields inside
//! a well-formed document resolve to defaults instead (see `extract`).

use thiserror::Error;

/// Fatal failure while reading a score document. No partial result is
/// ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid UTF-8 in MusicXML data: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document parsed as XML but lacks the `score-partwise` wrapper.
    #[error("unsupported root element '{0}', only 'score-partwise' is supported")]
    UnsupportedRoot(String),

    #[error("MXL archive error: {0}")]
    Archive(String),
}

impl From<zip::result::ZipError> for ParseError {
    fn from(e: zip::result::ZipError) -> Self {
        ParseError::Archive(e.to_string())
    }
}
