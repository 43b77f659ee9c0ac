//! Noder over the directory view of the staging index.

use shelf_index::{IndexTree, IndexTreeKind};
use shelf_types::ObjectId;

use crate::error::DiffResult;
use crate::noder::{leaf_hash, Noder};

/// Borrowed view of one [`IndexTree`] node.
///
/// Directories report the id of the tree object they would be written as,
/// so they compare equal to a committed directory with the same content.
#[derive(Clone, Copy, Debug)]
pub struct IndexNode<'a> {
    tree: &'a IndexTree,
}

impl<'a> IndexNode<'a> {
    pub fn new(tree: &'a IndexTree) -> Self {
        Self { tree }
    }
}

impl Noder for IndexNode<'_> {
    fn name(&self) -> &str {
        &self.tree.name
    }

    fn path(&self) -> &str {
        &self.tree.path
    }

    fn hash(&self) -> ObjectId {
        match &self.tree.kind {
            IndexTreeKind::File { object_id, mode } => leaf_hash(object_id, *mode),
            IndexTreeKind::Dir { id, .. } => *id,
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self.tree.kind, IndexTreeKind::Dir { .. })
    }

    fn children(&self) -> DiffResult<Vec<Self>> {
        Ok(self.tree.children().iter().map(IndexNode::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use shelf_index::{Index, StatInfo};
    use shelf_store::EntryMode;

    use super::*;
    use crate::change::Action;
    use crate::tree_diff::diff_tree;

    fn stage(index: &mut Index, path: &str, content: &str, mode: EntryMode) {
        index
            .upsert(
                path,
                ObjectId::from_bytes(content.as_bytes()),
                mode,
                StatInfo::new(content.len() as u64, SystemTime::UNIX_EPOCH),
            )
            .unwrap();
    }

    #[test]
    fn staged_edit_is_a_modify() {
        let mut before = Index::new();
        stage(&mut before, "etc/hosts", "a", EntryMode::Regular);
        stage(&mut before, "etc/fstab", "b", EntryMode::Regular);
        let mut after = before.clone();
        stage(&mut after, "etc/hosts", "c", EntryMode::Regular);

        let from = IndexTree::build(&before, "").unwrap().unwrap();
        let to = IndexTree::build(&after, "").unwrap().unwrap();
        let changes = diff_tree(Some(&IndexNode::new(&from)), Some(&IndexNode::new(&to))).unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, Action::Modify);
        assert_eq!(changes[0].path(), "etc/hosts");
    }

    #[test]
    fn mode_change_is_a_modify() {
        let mut before = Index::new();
        stage(&mut before, "bin/run", "#!/bin/sh", EntryMode::Regular);
        let mut after = Index::new();
        stage(&mut after, "bin/run", "#!/bin/sh", EntryMode::Executable);

        let from = IndexTree::build(&before, "").unwrap().unwrap();
        let to = IndexTree::build(&after, "").unwrap().unwrap();
        let changes = diff_tree(Some(&IndexNode::new(&from)), Some(&IndexNode::new(&to))).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path(), "bin/run");
    }
}
