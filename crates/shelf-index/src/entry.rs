//! Index entry types for tracking working directory files.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use shelf_store::EntryMode;
use shelf_types::ObjectId;

/// Stat metadata captured when a file was staged.
///
/// Fields the platform cannot provide are left at zero / `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatInfo {
    /// File size in bytes (link length for symlinks).
    pub size: u64,
    /// Last modification time.
    pub mtime: SystemTime,
    /// Last status change time, where available.
    pub ctime: Option<SystemTime>,
    /// Device id.
    pub dev: u64,
    /// Inode number.
    pub inode: u64,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
}

impl StatInfo {
    /// Stat info carrying only a size and modification time.
    pub fn new(size: u64, mtime: SystemTime) -> Self {
        Self {
            size,
            mtime,
            ctime: None,
            dev: 0,
            inode: 0,
            uid: 0,
            gid: 0,
        }
    }
}

/// An entry in the staging index, representing a tracked file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Canonical path relative to the canonical root.
    pub path: String,
    /// Content-addressed ID of the file's blob in the object store.
    pub object_id: ObjectId,
    /// File mode (regular, executable, symlink).
    pub mode: EntryMode,
    /// Stat metadata at staging time.
    pub stat: StatInfo,
}

impl IndexEntry {
    /// Create a new index entry.
    pub fn new(
        path: impl Into<String>,
        object_id: ObjectId,
        mode: EntryMode,
        stat: StatInfo,
    ) -> Self {
        Self {
            path: path.into(),
            object_id,
            mode,
            stat,
        }
    }

    /// Returns `true` when this entry already records exactly this state.
    pub fn same_state(&self, object_id: &ObjectId, mode: EntryMode, stat: &StatInfo) -> bool {
        self.object_id == *object_id && self.mode == mode && self.stat == *stat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_state_compares_hash_mode_and_stat() {
        let stat = StatInfo::new(3, SystemTime::UNIX_EPOCH);
        let id = ObjectId::from_bytes(b"abc");
        let entry = IndexEntry::new("a.txt", id, EntryMode::Regular, stat.clone());

        assert!(entry.same_state(&id, EntryMode::Regular, &stat));
        assert!(!entry.same_state(&id, EntryMode::Executable, &stat));
        assert!(!entry.same_state(&ObjectId::from_bytes(b"x"), EntryMode::Regular, &stat));
        assert!(!entry.same_state(&id, EntryMode::Regular, &StatInfo::new(4, SystemTime::UNIX_EPOCH)));
    }
}
