//! Noder over a committed tree, loaded lazily from the object store.

use shelf_store::{EntryMode, ObjectStore};
use shelf_types::ObjectId;

use crate::error::DiffResult;
use crate::noder::{leaf_hash, Noder};

/// One entry of a committed tree.
///
/// Directory contents are read from the store only when the differ asks
/// for children, so unchanged subtrees are never loaded.
pub struct TreeNode<'a> {
    store: &'a dyn ObjectStore,
    name: String,
    path: String,
    object_id: ObjectId,
    mode: EntryMode,
}

impl<'a> TreeNode<'a> {
    /// Root node for the tree object `tree_id`, placed at `path`.
    pub fn root(store: &'a dyn ObjectStore, tree_id: ObjectId, path: &str) -> Self {
        Self {
            store,
            name: shelf_index::path::file_name(path).to_string(),
            path: path.to_string(),
            object_id: tree_id,
            mode: EntryMode::Directory,
        }
    }
}

impl std::fmt::Debug for TreeNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNode")
            .field("path", &self.path)
            .field("object_id", &self.object_id)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Noder for TreeNode<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn hash(&self) -> ObjectId {
        if self.mode.is_dir() {
            self.object_id
        } else {
            leaf_hash(&self.object_id, self.mode)
        }
    }

    fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    fn children(&self) -> DiffResult<Vec<Self>> {
        if !self.is_dir() {
            return Ok(Vec::new());
        }
        let tree = self.store.read_tree(&self.object_id)?;
        Ok(tree
            .entries
            .into_iter()
            .map(|entry| TreeNode {
                store: self.store,
                path: shelf_index::path::join(&self.path, &entry.name),
                name: entry.name,
                object_id: entry.object_id,
                mode: entry.mode,
            })
            .collect())
    }
}
