//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The stored HEAD value is not a valid object id.
    #[error("malformed HEAD: {0}")]
    MalformedHead(#[from] shelf_types::TypeError),

    /// HEAD cannot point at the null object.
    #[error("HEAD cannot point at the null object")]
    NullTarget,

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
