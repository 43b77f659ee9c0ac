//! On-disk loose object store.
//!
//! Layout, one file per object:
//!
//! ```text
//! objects/
//!   ab/
//!     cdef0123...   [1 byte: kind tag][N bytes: zstd-compressed payload]
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use shelf_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

const COMPRESSION_LEVEL: i32 = 3;

/// Filesystem-backed object store keeping every object in its own file.
///
/// Writes go to a temporary file in the destination directory and are
/// renamed into place, so readers see either the whole object or nothing.
/// Reads re-hash the decoded payload and reject files whose content no
/// longer matches their name.
#[derive(Debug)]
pub struct LooseObjectStore {
    root: PathBuf,
}

impl LooseObjectStore {
    /// Open (or create) a loose object directory.
    pub fn open(root: &Path) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// The directory holding the fan-out subdirectories.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    fn encode(object: &StoredObject) -> StoreResult<Vec<u8>> {
        let compressed = zstd::encode_all(object.data.as_slice(), COMPRESSION_LEVEL)?;
        let mut body = Vec::with_capacity(compressed.len() + 1);
        body.push(object.kind.type_byte());
        body.extend_from_slice(&compressed);
        Ok(body)
    }

    fn decode(id: &ObjectId, body: &[u8]) -> StoreResult<StoredObject> {
        let (tag, payload) = body.split_first().ok_or_else(|| StoreError::CorruptObject {
            id: *id,
            reason: "empty object file".to_string(),
        })?;
        let kind = ObjectKind::from_type_byte(*tag).ok_or_else(|| StoreError::CorruptObject {
            id: *id,
            reason: format!("unknown kind tag {tag}"),
        })?;
        let data = zstd::decode_all(payload).map_err(|e| StoreError::CorruptObject {
            id: *id,
            reason: format!("decompression failed: {e}"),
        })?;
        Ok(StoredObject::new(kind, data))
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let body = match fs::read(self.object_path(id)) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let object = Self::decode(id, &body)?;
        let computed = object.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }

        let path = self.object_path(&id);
        if path.try_exists()? {
            return Ok(id);
        }

        let dir = path
            .parent()
            .ok_or_else(|| StoreError::Io(io::Error::other("object path has no parent")))?;
        fs::create_dir_all(dir)?;

        let body = Self::encode(object)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "object written");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).try_exists()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, Tree};

    #[test]
    fn write_then_read_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::open(&dir.path().join("objects")).unwrap();

        let id = store.put(ObjectKind::Blob, b"hello loose world").unwrap();
        let blob = store.read_blob(&id).unwrap();
        assert_eq!(blob.data, b"hello loose world");
        assert_eq!(id, Blob::id_for(b"hello loose world"));
    }

    #[test]
    fn objects_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let objects = dir.path().join("objects");
        let id = {
            let store = LooseObjectStore::open(&objects).unwrap();
            store.write(&Tree::empty().to_stored_object().unwrap()).unwrap()
        };

        let reopened = LooseObjectStore::open(&objects).unwrap();
        assert!(reopened.exists(&id).unwrap());
        assert!(reopened.read_tree(&id).unwrap().is_empty());
    }

    #[test]
    fn rewriting_same_content_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::open(dir.path()).unwrap();

        let id1 = store.put(ObjectKind::Blob, b"same").unwrap();
        let id2 = store.put(ObjectKind::Blob, b"same").unwrap();
        assert_eq!(id1, id2);

        let fanout = store.root().join(&id1.to_hex()[..2]);
        assert_eq!(fs::read_dir(fanout).unwrap().count(), 1);
    }

    #[test]
    fn missing_object_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::open(dir.path()).unwrap();
        let id = ObjectId::from_bytes(b"absent");
        assert!(store.read(&id).unwrap().is_none());
        assert!(matches!(store.get(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn tampered_object_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::open(dir.path()).unwrap();
        let id = store.put(ObjectKind::Blob, b"original").unwrap();

        let other = StoredObject::new(ObjectKind::Blob, b"tampered".to_vec());
        fs::write(
            store.object_path(&id),
            LooseObjectStore::encode(&other).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            store.read(&id),
            Err(StoreError::HashMismatch { .. })
        ));
    }

    #[test]
    fn truncated_object_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::open(dir.path()).unwrap();
        let id = store.put(ObjectKind::Blob, b"will be truncated").unwrap();
        fs::write(store.object_path(&id), []).unwrap();

        assert!(matches!(
            store.read(&id),
            Err(StoreError::CorruptObject { .. })
        ));
    }
}
