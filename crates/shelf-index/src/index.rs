//! The core Index structure managing staged entries in memory.
//!
//! The [`Index`] manages a `BTreeMap<String, IndexEntry>` as the staging area.
//! It is read whole from disk on [`Index::load`] and rewritten whole on
//! [`Index::save`]; there is no incremental durability. Two processes that
//! load, modify and save the same file race, and the last writer wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::ops::Bound;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shelf_store::{EntryMode, ObjectStore};
use shelf_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::entry::{IndexEntry, StatInfo};
use crate::error::{IndexError, IndexResult};
use crate::path;
use crate::tree::IndexTree;

const INDEX_VERSION: u32 = 1;

/// On-disk form of the index.
#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    entries: Vec<IndexEntry>,
}

/// The staging index: every tracked file with the state recorded at its
/// last `add`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<String, IndexEntry>,
}

impl Index {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by path, or `None`. Paths that cannot be normalized
    /// have no entry.
    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        let key = path::normalize(path).ok()?;
        self.entries.get(&key)
    }

    /// Get an entry by path, or [`IndexError::EntryNotFound`].
    pub fn entry(&self, path: &str) -> IndexResult<&IndexEntry> {
        let key = path::normalize(path)?;
        match self.entries.get(&key) {
            Some(entry) => Ok(entry),
            None => Err(IndexError::EntryNotFound(key)),
        }
    }

    /// All entries in path order. Each call starts a fresh iteration.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.entries.values()
    }

    /// Entries equal to or beneath `prefix`, in path order.
    pub fn entries_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a IndexEntry> + 'a {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(p, _)| p.starts_with(prefix))
            .filter(move |(p, _)| path::is_under(p, prefix))
            .map(|(_, e)| e)
    }

    /// Insert or update the entry for `path`.
    ///
    /// A file cannot sit under another file or above other entries, so any
    /// entry at an ancestor of `path` or beneath it is dropped first.
    ///
    /// Returns `true` when the index changed, `false` when the entry already
    /// recorded exactly this state.
    pub fn upsert(
        &mut self,
        path: &str,
        object_id: ObjectId,
        mode: EntryMode,
        stat: StatInfo,
    ) -> IndexResult<bool> {
        let path = path::normalize(path)?;
        if path.is_empty() {
            return Err(IndexError::InvalidPath("empty path".to_string()));
        }

        let evicted = self.evict_conflicts(&path);
        if evicted == 0 {
            if let Some(existing) = self.entries.get(&path) {
                if existing.same_state(&object_id, mode, &stat) {
                    return Ok(false);
                }
            }
        }

        self.entries
            .insert(path.clone(), IndexEntry::new(path, object_id, mode, stat));
        Ok(true)
    }

    fn evict_conflicts(&mut self, path: &str) -> usize {
        let mut doomed: Vec<String> = path::ancestors(path)
            .filter(|a| self.entries.contains_key(*a))
            .map(str::to_string)
            .collect();
        doomed.extend(
            self.entries_under(path)
                .filter(|e| e.path != path)
                .map(|e| e.path.clone()),
        );
        for stale in &doomed {
            self.entries.remove(stale);
            debug!(path = %stale, replaced_by = path, "dropped conflicting index entry");
        }
        doomed.len()
    }

    /// Remove an entry, returning the blob id it recorded.
    pub fn remove(&mut self, path: &str) -> IndexResult<ObjectId> {
        let key = path::normalize(path)?;
        match self.entries.remove(&key) {
            Some(entry) => Ok(entry.object_id),
            None => Err(IndexError::EntryNotFound(key)),
        }
    }

    /// An ephemeral sub-index holding only the entries under `prefix`.
    pub fn scoped(&self, prefix: &str) -> Index {
        let entries = self
            .entries_under(prefix)
            .map(|e| (e.path.clone(), e.clone()))
            .collect();
        Index { entries }
    }

    // ---------------------------------------------------------------
    // Tree building
    // ---------------------------------------------------------------

    /// Write the whole index as nested tree objects and return the root
    /// tree id. An empty index writes the empty tree.
    pub fn write_tree(&self, store: &dyn ObjectStore) -> IndexResult<ObjectId> {
        match IndexTree::build(self, "")? {
            Some(root) => root.write(store),
            None => Ok(store.write(&shelf_store::Tree::empty().to_stored_object()?)?),
        }
    }

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    /// Load an index file. A missing file yields an empty index.
    pub fn load(file: &Path) -> IndexResult<Self> {
        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %file.display(), "no index file; starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        let decoded: IndexFile =
            bincode::deserialize(&bytes).map_err(|e| IndexError::Serialization(e.to_string()))?;
        if decoded.version != INDEX_VERSION {
            return Err(IndexError::UnsupportedVersion(decoded.version));
        }

        let entries: BTreeMap<String, IndexEntry> = decoded
            .entries
            .into_iter()
            .map(|e| (e.path.clone(), e))
            .collect();
        debug!(path = %file.display(), entries = entries.len(), "index loaded");
        Ok(Self { entries })
    }

    /// Rewrite the whole index file atomically.
    pub fn save(&self, file: &Path) -> IndexResult<()> {
        let encoded = IndexFile {
            version: INDEX_VERSION,
            entries: self.entries.values().cloned().collect(),
        };
        let bytes =
            bincode::serialize(&encoded).map_err(|e| IndexError::Serialization(e.to_string()))?;

        let dir = file
            .parent()
            .ok_or_else(|| IndexError::InvalidPath(file.display().to_string()))?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(file).map_err(|e| IndexError::Io(e.error))?;

        debug!(path = %file.display(), entries = self.entries.len(), "index saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use shelf_store::{InMemoryObjectStore, ObjectKind};

    fn stat(size: u64) -> StatInfo {
        StatInfo::new(size, SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }

    fn oid(b: &[u8]) -> ObjectId {
        ObjectId::from_bytes(b)
    }

    #[test]
    fn new_index_is_empty() {
        let idx = Index::new();
        assert!(idx.is_empty());
        assert_eq!(idx.len(), 0);
    }

    #[test]
    fn upsert_inserts_then_updates() {
        let mut idx = Index::new();
        assert!(idx.upsert("a.txt", oid(b"1"), EntryMode::Regular, stat(1)).unwrap());
        assert!(idx.upsert("a.txt", oid(b"2"), EntryMode::Regular, stat(2)).unwrap());
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.entry("a.txt").unwrap().object_id, oid(b"2"));
    }

    #[test]
    fn upsert_same_state_is_not_a_change() {
        let mut idx = Index::new();
        idx.upsert("a.txt", oid(b"1"), EntryMode::Regular, stat(1)).unwrap();
        assert!(!idx.upsert("a.txt", oid(b"1"), EntryMode::Regular, stat(1)).unwrap());
    }

    #[test]
    fn upsert_normalizes_path() {
        let mut idx = Index::new();
        idx.upsert("/home//u/a.txt", oid(b"1"), EntryMode::Regular, stat(1))
            .unwrap();
        assert!(idx.get("home/u/a.txt").is_some());
    }

    #[test]
    fn upsert_rejects_empty_path() {
        let mut idx = Index::new();
        let result = idx.upsert("/", oid(b"1"), EntryMode::Regular, stat(1));
        assert!(matches!(result, Err(IndexError::InvalidPath(_))));
    }

    #[test]
    fn entry_miss_is_entry_not_found() {
        let idx = Index::new();
        assert!(matches!(idx.entry("nope"), Err(IndexError::EntryNotFound(p)) if p == "nope"));
    }

    #[test]
    fn remove_returns_recorded_hash() {
        let mut idx = Index::new();
        idx.upsert("file.txt", oid(b"c"), EntryMode::Regular, stat(1)).unwrap();
        assert_eq!(idx.remove("file.txt").unwrap(), oid(b"c"));
        assert!(idx.is_empty());
        assert!(matches!(idx.remove("file.txt"), Err(IndexError::EntryNotFound(_))));
    }

    #[test]
    fn entries_iteration_is_restartable() {
        let mut idx = Index::new();
        idx.upsert("b", oid(b"b"), EntryMode::Regular, stat(1)).unwrap();
        idx.upsert("a", oid(b"a"), EntryMode::Regular, stat(1)).unwrap();
        let first: Vec<_> = idx.entries().map(|e| e.path.clone()).collect();
        let second: Vec<_> = idx.entries().map(|e| e.path.clone()).collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn scoped_uses_component_prefix() {
        let mut idx = Index::new();
        idx.upsert("home/a/x", oid(b"1"), EntryMode::Regular, stat(1)).unwrap();
        idx.upsert("home/a.txt", oid(b"2"), EntryMode::Regular, stat(1)).unwrap();
        idx.upsert("home/ab/y", oid(b"3"), EntryMode::Regular, stat(1)).unwrap();
        idx.upsert("home/a/z", oid(b"4"), EntryMode::Regular, stat(1)).unwrap();

        let scoped = idx.scoped("home/a");
        let paths: Vec<_> = scoped.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["home/a/x", "home/a/z"]);

        let single = idx.scoped("home/a.txt");
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn file_under_staged_file_replaces_it() {
        let mut idx = Index::new();
        idx.upsert("work/p", oid(b"file"), EntryMode::Regular, stat(4)).unwrap();
        idx.upsert("work/q", oid(b"q"), EntryMode::Regular, stat(1)).unwrap();

        assert!(idx.upsert("work/p/q", oid(b"nested"), EntryMode::Regular, stat(6)).unwrap());
        let paths: Vec<_> = idx.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["work/p/q", "work/q"]);
        assert!(IndexTree::build(&idx, "work").is_ok());
    }

    #[test]
    fn file_over_staged_directory_replaces_its_entries() {
        let mut idx = Index::new();
        idx.upsert("d/x", oid(b"x"), EntryMode::Regular, stat(1)).unwrap();
        idx.upsert("d/sub/y", oid(b"y"), EntryMode::Regular, stat(1)).unwrap();
        idx.upsert("dz", oid(b"z"), EntryMode::Regular, stat(1)).unwrap();

        assert!(idx.upsert("d", oid(b"flat"), EntryMode::Regular, stat(4)).unwrap());
        let paths: Vec<_> = idx.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["d", "dz"]);
        assert!(IndexTree::build(&idx, "").is_ok());
    }

    #[test]
    fn lookups_normalize_like_upsert() {
        let mut idx = Index::new();
        idx.upsert("a.txt", oid(b"1"), EntryMode::Regular, stat(1)).unwrap();
        assert!(idx.get("/a.txt").is_some());
        assert!(idx.get("../a.txt").is_none());
        assert_eq!(idx.entry("./a.txt").unwrap().path, "a.txt");
        assert_eq!(idx.remove("//a.txt").unwrap(), oid(b"1"));
        assert!(idx.is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index");

        let mut idx = Index::new();
        let mut full = stat(5);
        full.ctime = Some(SystemTime::UNIX_EPOCH + Duration::from_secs(42));
        full.dev = 7;
        full.inode = 99;
        full.uid = 1000;
        full.gid = 1000;
        idx.upsert("etc/app.conf", oid(b"conf"), EntryMode::Regular, full)
            .unwrap();
        idx.upsert("bin/run", oid(b"run"), EntryMode::Executable, stat(9))
            .unwrap();
        idx.upsert("lnk", oid(b"target"), EntryMode::Symlink, stat(6))
            .unwrap();
        idx.save(&file).unwrap();

        let loaded = Index::load(&file).unwrap();
        assert_eq!(idx, loaded);
    }

    #[test]
    fn conflicting_index_file_fails_to_build() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index");
        let raw = IndexFile {
            version: INDEX_VERSION,
            entries: vec![
                IndexEntry::new("a".to_string(), oid(b"a"), EntryMode::Regular, stat(1)),
                IndexEntry::new("a/b".to_string(), oid(b"b"), EntryMode::Regular, stat(1)),
            ],
        };
        fs::write(&file, bincode::serialize(&raw).unwrap()).unwrap();

        let loaded = Index::load(&file).unwrap();
        assert!(matches!(
            IndexTree::build(&loaded, ""),
            Err(IndexError::PathConflict(p)) if p == "a"
        ));
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let idx = Index::load(&dir.path().join("absent")).unwrap();
        assert!(idx.is_empty());
    }

    #[test]
    fn load_garbage_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index");
        fs::write(&file, b"\xff\xff\xff\xff definitely not an index").unwrap();
        assert!(matches!(
            Index::load(&file),
            Err(IndexError::Serialization(_)) | Err(IndexError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn write_tree_builds_nested_trees() {
        let store = InMemoryObjectStore::new();
        let blob_a = store.put(ObjectKind::Blob, b"alpha").unwrap();
        let blob_b = store.put(ObjectKind::Blob, b"beta").unwrap();

        let mut idx = Index::new();
        idx.upsert("top.txt", blob_a, EntryMode::Regular, stat(5)).unwrap();
        idx.upsert("dir/sub/deep.txt", blob_b, EntryMode::Executable, stat(4))
            .unwrap();

        let root_id = idx.write_tree(&store).unwrap();
        let root = store.read_tree(&root_id).unwrap();
        assert_eq!(root.len(), 2);
        assert_eq!(root.get("top.txt").unwrap().object_id, blob_a);

        let dir_entry = root.get("dir").unwrap();
        assert_eq!(dir_entry.mode, EntryMode::Directory);
        let sub = store.read_tree(&dir_entry.object_id).unwrap();
        let deep = store
            .read_tree(&sub.get("sub").unwrap().object_id)
            .unwrap();
        let leaf = deep.get("deep.txt").unwrap();
        assert_eq!(leaf.object_id, blob_b);
        assert_eq!(leaf.mode, EntryMode::Executable);
    }

    #[test]
    fn write_tree_of_empty_index_is_empty_tree() {
        let store = InMemoryObjectStore::new();
        let id = Index::new().write_tree(&store).unwrap();
        assert!(store.read_tree(&id).unwrap().is_empty());
    }
}
