//! Noder over the live filesystem.

use std::path::{Path, PathBuf};

use shelf_diff::{leaf_hash, DiffError, DiffResult, Noder};
use shelf_index::path;
use shelf_store::Blob;
use shelf_types::ObjectId;

use crate::fs::{FileKind, Filesystem, FsError, FsResult, Metadata};

/// A file, symlink or directory under the canonical root.
///
/// Leaves are hashed when the node is created, so a listing that succeeds
/// has already read every file in it. Directories report
/// [`ObjectId::null`] and are therefore always descended into.
#[derive(Clone)]
pub struct FsNode<'a> {
    fs: &'a dyn Filesystem,
    root: &'a Path,
    excluded: &'a [String],
    name: String,
    path: String,
    kind: FileKind,
    hash: ObjectId,
}

impl<'a> FsNode<'a> {
    /// Node for the canonical path `at`, or `None` when nothing exists
    /// there.
    ///
    /// `root` is the absolute canonical root. Canonical paths under any of
    /// `excluded` are invisible.
    pub fn open(
        fs: &'a dyn Filesystem,
        root: &'a Path,
        excluded: &'a [String],
        at: &str,
    ) -> FsResult<Option<Self>> {
        if is_excluded(excluded, at) {
            return Ok(None);
        }
        let abs = absolute(root, at);
        match fs.lstat(&abs) {
            Ok(metadata) if metadata.kind == FileKind::Other => Ok(None),
            Ok(metadata) => Self::from_metadata(fs, root, excluded, at, &metadata).map(Some),
            Err(FsError::NotExist(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn from_metadata(
        fs: &'a dyn Filesystem,
        root: &'a Path,
        excluded: &'a [String],
        at: &str,
        metadata: &Metadata,
    ) -> FsResult<Self> {
        let hash = if metadata.is_dir() {
            ObjectId::null()
        } else {
            let content = fs.leaf_content(&absolute(root, at), metadata)?;
            leaf_hash(&Blob::id_for(&content), metadata.entry_mode())
        };
        Ok(Self {
            fs,
            root,
            excluded,
            name: path::file_name(at).to_string(),
            path: at.to_string(),
            kind: metadata.kind,
            hash,
        })
    }
}

impl std::fmt::Debug for FsNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsNode")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("hash", &self.hash)
            .finish()
    }
}

impl Noder for FsNode<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn hash(&self) -> ObjectId {
        self.hash
    }

    fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    fn children(&self) -> DiffResult<Vec<Self>> {
        if !self.is_dir() {
            return Ok(Vec::new());
        }
        let node_error = |source: FsError| DiffError::Node {
            path: self.path.clone(),
            source: Box::new(source),
        };

        let entries = self
            .fs
            .read_dir(&absolute(self.root, &self.path))
            .map_err(node_error)?;
        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            let child = path::join(&self.path, &entry.name);
            if entry.metadata.kind == FileKind::Other || is_excluded(self.excluded, &child) {
                continue;
            }
            let node = Self::from_metadata(self.fs, self.root, self.excluded, &child, &entry.metadata)
                .map_err(node_error)?;
            children.push(node);
        }
        Ok(children)
    }
}

/// Absolute location of a canonical path.
pub(crate) fn absolute(root: &Path, canonical: &str) -> PathBuf {
    if canonical.is_empty() {
        root.to_path_buf()
    } else {
        root.join(canonical)
    }
}

fn is_excluded(excluded: &[String], at: &str) -> bool {
    excluded.iter().any(|ex| path::is_under(at, ex))
}
