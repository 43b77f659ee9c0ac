//! Folding differ output into per-path status.

use shelf_diff::{Action, Change};
use shelf_index::{Status, StatusCode};

/// Apply committed-vs-index changes to the staging column.
///
/// Every path touched here starts from an unmodified worktree.
pub fn fold_staging(status: &mut Status, changes: &[Change]) {
    for change in changes {
        let file = status.file_mut(change.path());
        file.worktree = StatusCode::Unmodified;
        file.staging = match change.action {
            Action::Delete => StatusCode::Deleted,
            Action::Insert => StatusCode::Added,
            Action::Modify => StatusCode::Modified,
        };
    }
}

/// Apply index-vs-filesystem changes to the worktree column.
///
/// A path first seen here carries no staged state. An insert means the
/// filesystem has content that was never added, so both columns become
/// untracked.
pub fn fold_worktree(status: &mut Status, changes: &[Change]) {
    for change in changes {
        let file = status.file_mut(change.path());
        if file.staging == StatusCode::Untracked {
            file.staging = StatusCode::Unmodified;
        }
        match change.action {
            Action::Delete => file.worktree = StatusCode::Deleted,
            Action::Insert => {
                file.staging = StatusCode::Untracked;
                file.worktree = StatusCode::Untracked;
            }
            Action::Modify => file.worktree = StatusCode::Modified,
        }
    }
}
