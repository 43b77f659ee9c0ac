//! The [`RefStore`] trait defining the reference storage interface.

use shelf_types::ObjectId;

use crate::error::Result;

/// Storage backend for the current snapshot pointer.
pub trait RefStore: Send + Sync {
    /// Read the current HEAD commit.
    ///
    /// Returns `Ok(None)` if no commit has been recorded yet.
    fn head(&self) -> Result<Option<ObjectId>>;

    /// Point HEAD at a commit.
    fn set_head(&self, commit: ObjectId) -> Result<()>;
}
