//! Error types for the worktree crate.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::fs::FsError;

/// Errors that can occur during worktree operations.
#[derive(Debug, thiserror::Error)]
pub enum WorktreeError {
    /// Filesystem access failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// Tracked-root configuration could not be read or updated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Object store operation failed.
    #[error("store error: {0}")]
    Store(#[from] shelf_store::StoreError),

    /// Index operation failed.
    #[error("index error: {0}")]
    Index(#[from] shelf_index::IndexError),

    /// Diffing failed.
    #[error("diff error: {0}")]
    Diff(#[from] shelf_diff::DiffError),

    /// HEAD could not be read or moved.
    #[error("ref error: {0}")]
    Ref(#[from] shelf_refs::RefError),

    /// The path does not lie under the canonical root.
    #[error("{} is outside the canonical root {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// The path cannot be expressed as a canonical path.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// The path lies inside the repository directory, which is never tracked.
    #[error("{0} is inside the repository directory")]
    InsideRepository(String),

    /// Sockets, FIFOs and device nodes cannot be added.
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    /// No repository exists at the given directory.
    #[error("not a shelf repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// The index is empty or matches the HEAD commit.
    #[error("nothing to commit")]
    NothingToCommit,

    /// Repository directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorktreeError {
    /// Returns `true` when the error reports a path that does not exist.
    pub fn is_not_exist(&self) -> bool {
        matches!(self, Self::Fs(FsError::NotExist(_)))
    }
}

/// Convenience alias for worktree results.
pub type WorktreeResult<T> = Result<T, WorktreeError>;
