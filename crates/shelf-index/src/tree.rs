//! Directory view of the index.
//!
//! The index is flat (path → entry). Diffing and committing need it as a
//! hierarchy, with each directory carrying the id of the [`Tree`] object it
//! would be written as. Because that id is computed the same way for the
//! index and for a committed snapshot, identical subtrees on both sides
//! compare equal without descending.

use std::collections::btree_map::{self, BTreeMap};

use shelf_store::{EntryMode, ObjectStore, Tree, TreeEntry};
use shelf_types::ObjectId;

use crate::entry::IndexEntry;
use crate::error::{IndexError, IndexResult};
use crate::index::Index;
use crate::path;

/// One node of the directory view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexTree {
    /// Last path component (`""` for the canonical root).
    pub name: String,
    /// Canonical path of this node.
    pub path: String,
    pub kind: IndexTreeKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexTreeKind {
    /// A staged file.
    File { object_id: ObjectId, mode: EntryMode },
    /// A directory; `id` is the id of its tree object, children are sorted
    /// by name.
    Dir {
        id: ObjectId,
        children: Vec<IndexTree>,
    },
}

enum Slot<'a> {
    File(&'a IndexEntry),
    Dir(BTreeMap<String, Slot<'a>>),
}

impl IndexTree {
    /// Build the directory view of the entries under `prefix`.
    ///
    /// Returns `None` when nothing is staged under `prefix`. When `prefix`
    /// itself is a staged file the result is a single file node.
    pub fn build(index: &Index, prefix: &str) -> IndexResult<Option<IndexTree>> {
        let mut root: BTreeMap<String, Slot<'_>> = BTreeMap::new();
        let mut root_file: Option<&IndexEntry> = None;

        for entry in index.entries_under(prefix) {
            if entry.path == prefix {
                root_file = Some(entry);
                continue;
            }
            let rest = if prefix.is_empty() {
                entry.path.as_str()
            } else {
                &entry.path[prefix.len() + 1..]
            };
            let components: Vec<&str> = rest.split('/').collect();
            insert(&mut root, &components, entry)?;
        }

        match (root_file, root.is_empty()) {
            (Some(entry), true) => Ok(Some(IndexTree {
                name: path::file_name(prefix).to_string(),
                path: prefix.to_string(),
                kind: IndexTreeKind::File {
                    object_id: entry.object_id,
                    mode: entry.mode,
                },
            })),
            (Some(entry), false) => Err(IndexError::PathConflict(entry.path.clone())),
            (None, true) => Ok(None),
            (None, false) => finish(path::file_name(prefix), prefix, Slot::Dir(root)).map(Some),
        }
    }

    /// The id diffing should use for this node: the tree id for
    /// directories, the blob id for files.
    pub fn object_id(&self) -> ObjectId {
        match &self.kind {
            IndexTreeKind::File { object_id, .. } => *object_id,
            IndexTreeKind::Dir { id, .. } => *id,
        }
    }

    /// The mode this node is recorded with in its parent tree.
    pub fn mode(&self) -> EntryMode {
        match &self.kind {
            IndexTreeKind::File { mode, .. } => *mode,
            IndexTreeKind::Dir { .. } => EntryMode::Directory,
        }
    }

    /// Children of a directory node; empty for files.
    pub fn children(&self) -> &[IndexTree] {
        match &self.kind {
            IndexTreeKind::File { .. } => &[],
            IndexTreeKind::Dir { children, .. } => children,
        }
    }

    /// Write this node's tree objects bottom-up and return its id.
    ///
    /// File nodes already live in the store as blobs and are not rewritten.
    pub fn write(&self, store: &dyn ObjectStore) -> IndexResult<ObjectId> {
        match &self.kind {
            IndexTreeKind::File { object_id, .. } => Ok(*object_id),
            IndexTreeKind::Dir { children, .. } => {
                let mut entries = Vec::with_capacity(children.len());
                for child in children {
                    let id = child.write(store)?;
                    entries.push(TreeEntry::new(child.mode(), child.name.clone(), id));
                }
                let tree = Tree::new(entries);
                Ok(store.write(&tree.to_stored_object()?)?)
            }
        }
    }
}

fn insert<'a>(
    dir: &mut BTreeMap<String, Slot<'a>>,
    components: &[&str],
    entry: &'a IndexEntry,
) -> IndexResult<()> {
    let (first, rest) = components
        .split_first()
        .ok_or_else(|| IndexError::InvalidPath(entry.path.clone()))?;

    if rest.is_empty() {
        return match dir.entry((*first).to_string()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(Slot::File(entry));
                Ok(())
            }
            btree_map::Entry::Occupied(_) => Err(IndexError::PathConflict(entry.path.clone())),
        };
    }

    let slot = dir
        .entry((*first).to_string())
        .or_insert_with(|| Slot::Dir(BTreeMap::new()));
    match slot {
        Slot::Dir(children) => insert(children, rest, entry),
        Slot::File(file) => Err(IndexError::PathConflict(file.path.clone())),
    }
}

fn finish(name: &str, node_path: &str, slot: Slot<'_>) -> IndexResult<IndexTree> {
    match slot {
        Slot::File(entry) => Ok(IndexTree {
            name: name.to_string(),
            path: node_path.to_string(),
            kind: IndexTreeKind::File {
                object_id: entry.object_id,
                mode: entry.mode,
            },
        }),
        Slot::Dir(map) => {
            let mut children = Vec::with_capacity(map.len());
            for (child_name, child_slot) in map {
                let child_path = path::join(node_path, &child_name);
                children.push(finish(&child_name, &child_path, child_slot)?);
            }
            let tree = Tree::new(
                children
                    .iter()
                    .map(|c| TreeEntry::new(c.mode(), c.name.clone(), c.object_id()))
                    .collect(),
            );
            Ok(IndexTree {
                name: name.to_string(),
                path: node_path.to_string(),
                kind: IndexTreeKind::Dir {
                    id: tree.compute_id()?,
                    children,
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::entry::StatInfo;
    use shelf_store::InMemoryObjectStore;

    fn index_with(paths: &[&str]) -> Index {
        let mut idx = Index::new();
        for p in paths {
            idx.upsert(
                p,
                ObjectId::from_bytes(p.as_bytes()),
                EntryMode::Regular,
                StatInfo::new(1, SystemTime::UNIX_EPOCH),
            )
            .unwrap();
        }
        idx
    }

    #[test]
    fn empty_prefix_builds_whole_index() {
        let idx = index_with(&["a/x", "a/y", "b"]);
        let root = IndexTree::build(&idx, "").unwrap().unwrap();
        assert_eq!(root.path, "");
        let names: Vec<_> = root.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(root.children()[0].children()[1].path, "a/y");
    }

    #[test]
    fn nothing_under_prefix_is_none() {
        let idx = index_with(&["a/x"]);
        assert!(IndexTree::build(&idx, "b").unwrap().is_none());
    }

    #[test]
    fn prefix_naming_a_file_is_a_leaf() {
        let idx = index_with(&["home/u/.vimrc", "home/u/.bashrc"]);
        let node = IndexTree::build(&idx, "home/u/.vimrc").unwrap().unwrap();
        assert_eq!(node.name, ".vimrc");
        assert!(matches!(node.kind, IndexTreeKind::File { .. }));
    }

    #[test]
    fn scoped_root_is_named_after_prefix() {
        let idx = index_with(&["home/u/.config/nvim/init.lua"]);
        let node = IndexTree::build(&idx, "home/u/.config").unwrap().unwrap();
        assert_eq!(node.name, ".config");
        assert_eq!(node.children()[0].path, "home/u/.config/nvim");
    }

    #[test]
    fn dir_id_matches_written_tree() {
        let store = InMemoryObjectStore::new();
        let idx = index_with(&["d/one", "d/two", "d/sub/three"]);
        let root = IndexTree::build(&idx, "").unwrap().unwrap();
        let written = root.write(&store).unwrap();
        assert_eq!(written, root.object_id());
        assert!(store.exists(&root.children()[0].object_id()).unwrap());
    }

    #[test]
    fn dir_id_changes_when_any_leaf_changes() {
        let before = IndexTree::build(&index_with(&["d/a", "d/b"]), "").unwrap().unwrap();
        let after = IndexTree::build(&index_with(&["d/a", "d/c"]), "").unwrap().unwrap();
        assert_ne!(before.object_id(), after.object_id());
    }

    #[test]
    fn nested_upsert_never_conflicts() {
        let idx = index_with(&["a", "a/b"]);
        let root = IndexTree::build(&idx, "").unwrap().unwrap();
        assert_eq!(root.children()[0].children()[0].path, "a/b");
    }
}
