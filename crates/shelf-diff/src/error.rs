//! Error types for the diff crate.

/// Errors that can occur during diff operations.
///
/// Nodes whose hash is unavailable are never an error: they are treated as
/// different from their counterpart and descended into.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Store operation failed while expanding a committed tree.
    #[error("store error: {0}")]
    Store(#[from] shelf_store::StoreError),

    /// Index operation failed while building its directory view.
    #[error("index error: {0}")]
    Index(#[from] shelf_index::IndexError),

    /// A node implementation failed to list its children.
    #[error("cannot read children of {path}: {source}")]
    Node {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
