//! Error types for marginalia

use thiserror::Error;

/// Path computation hit a node whose parent chain never reaches the tree root
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Detached node: {0}")]
pub struct DetachedNodeError(pub String);

impl DetachedNodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistError {
    /// The persisted payload could not be parsed
    #[error("Malformed payload under key '{key}': {source}")]
    Load {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The annotation set could not be serialized
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The underlying slot rejected the write
    #[error("Save failed for key '{key}': {reason}")]
    Save { key: String, reason: String },

    /// Storage I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The ordered writer is no longer running
    #[error("Writer closed")]
    WriterClosed,
}

/// Document parsing and selection errors
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to parse the XHTML source
    #[error("Parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    /// Closing tag without an open element
    #[error("Unbalanced markup: unexpected </{0}>")]
    Unbalanced(String),

    /// Character span lies outside the rendered text
    #[error("Selection {start}..{end} out of bounds (text length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Result type alias for persistence operations
pub type PersistResult<T> = std::result::Result<T, PersistError>;
