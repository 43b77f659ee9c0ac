//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The specified path has no entry in the index.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// An invalid path was provided.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A path is recorded both as a file and as a directory prefix.
    #[error("path is both a file and a directory in the index: {0}")]
    PathConflict(String),

    /// The index file was written by an incompatible version.
    #[error("unsupported index version {0}")]
    UnsupportedVersion(u32),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] shelf_store::StoreError),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while loading or saving the index file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
