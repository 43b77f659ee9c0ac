//! Per-path status types.
//!
//! A [`Status`] maps every path observed by the status passes to a
//! [`FileStatus`]: its staging state (committed snapshot vs index) and its
//! worktree state (index vs filesystem).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// State of one side of a path's status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Unmodified,
    Untracked,
    Modified,
    Added,
    Deleted,
}

impl StatusCode {
    /// One-letter code as used in short status output.
    pub fn code(&self) -> char {
        match self {
            Self::Unmodified => ' ',
            Self::Untracked => '?',
            Self::Modified => 'M',
            Self::Added => 'A',
            Self::Deleted => 'D',
        }
    }
}

/// Staging and worktree state of one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    /// Committed snapshot vs index.
    pub staging: StatusCode,
    /// Index vs filesystem.
    pub worktree: StatusCode,
}

impl FileStatus {
    /// The state of a path nothing has been recorded for yet.
    pub const UNTRACKED: Self = Self {
        staging: StatusCode::Untracked,
        worktree: StatusCode::Untracked,
    };

    /// The state of a tracked path with no differences anywhere.
    pub const CLEAN: Self = Self {
        staging: StatusCode::Unmodified,
        worktree: StatusCode::Unmodified,
    };

    /// Returns `true` when both sides are unmodified.
    pub fn is_clean(&self) -> bool {
        *self == Self::CLEAN
    }
}

/// Status of every path that differs somewhere, keyed by canonical path.
///
/// Paths absent from the map are tracked and unmodified on both sides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Status {
    files: BTreeMap<String, FileStatus>,
}

impl Status {
    /// Create an empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to a path's status, inserting
    /// [`FileStatus::UNTRACKED`] the first time a path is seen.
    pub fn file_mut(&mut self, path: &str) -> &mut FileStatus {
        self.files
            .entry(path.to_string())
            .or_insert(FileStatus::UNTRACKED)
    }

    /// Status of a path; paths no pass reported are clean.
    pub fn file(&self, path: &str) -> FileStatus {
        self.files.get(path).copied().unwrap_or(FileStatus::CLEAN)
    }

    /// Status of a path only if a pass reported it.
    pub fn get(&self, path: &str) -> Option<&FileStatus> {
        self.files.get(path)
    }

    /// Returns `true` if every reported path is clean.
    pub fn is_clean(&self) -> bool {
        self.files.values().all(FileStatus::is_clean)
    }

    /// Number of reported paths.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no path was reported.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Reported paths in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileStatus)> + '_ {
        self.files.iter().map(|(p, s)| (p.as_str(), s))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, status) in &self.files {
            writeln!(
                f,
                "{}{} {}",
                status.staging.code(),
                status.worktree.code(),
                path
            )?;
        }
        Ok(())
    }
}
