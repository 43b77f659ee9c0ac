//! The capability set the differ needs from a tree node.

use shelf_crypto::ContentHasher;
use shelf_store::EntryMode;
use shelf_types::ObjectId;

use crate::error::DiffResult;

/// A node in a tree the differ can walk.
///
/// Implementations exist for the staging index ([`crate::IndexNode`]),
/// committed trees ([`crate::TreeNode`]) and the live filesystem (in
/// `shelf-worktree`). Any pairing can be diffed.
pub trait Noder: Sized {
    /// Last path component.
    fn name(&self) -> &str;

    /// Canonical path relative to the canonical root.
    fn path(&self) -> &str;

    /// Content hash, or [`ObjectId::null`] when it is not available.
    ///
    /// Leaves must return [`leaf_hash`] of their blob id and mode so that
    /// leaves from different implementations compare correctly.
    fn hash(&self) -> ObjectId;

    /// Returns `true` for interior nodes.
    fn is_dir(&self) -> bool;

    /// Children of an interior node, in any order. Leaves return nothing.
    fn children(&self) -> DiffResult<Vec<Self>>;
}

/// Identity of a leaf for diffing: blob id and mode together, so a mode
/// change alone counts as a modification.
///
/// A null blob id stays null.
pub fn leaf_hash(object_id: &ObjectId, mode: EntryMode) -> ObjectId {
    if object_id.is_null() {
        return ObjectId::null();
    }
    ContentHasher::ENTRY.hash_parts(&[object_id.as_bytes(), &mode.mode_bits().to_le_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_hash_covers_mode() {
        let id = ObjectId::from_bytes(b"script");
        assert_ne!(
            leaf_hash(&id, EntryMode::Regular),
            leaf_hash(&id, EntryMode::Executable)
        );
    }

    #[test]
    fn leaf_hash_keeps_null() {
        assert!(leaf_hash(&ObjectId::null(), EntryMode::Regular).is_null());
    }
}
