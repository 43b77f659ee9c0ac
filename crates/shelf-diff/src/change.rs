//! Differ output.

use std::fmt;

use shelf_types::ObjectId;

use crate::noder::Noder;

/// What happened to a path between the two sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Present only on the "to" side.
    Insert,
    /// Present only on the "from" side.
    Delete,
    /// Present on both sides with different content.
    Modify,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Delete => write!(f, "delete"),
            Self::Modify => write!(f, "modify"),
        }
    }
}

/// Snapshot of the node a change refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRef {
    pub path: String,
    pub hash: ObjectId,
}

impl NodeRef {
    pub fn of<N: Noder>(node: &N) -> Self {
        Self {
            path: node.path().to_string(),
            hash: node.hash(),
        }
    }
}

/// One difference between two trees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub action: Action,
    pub from: Option<NodeRef>,
    pub to: Option<NodeRef>,
}

impl Change {
    pub fn insert<N: Noder>(to: &N) -> Self {
        Self {
            action: Action::Insert,
            from: None,
            to: Some(NodeRef::of(to)),
        }
    }

    pub fn delete<N: Noder>(from: &N) -> Self {
        Self {
            action: Action::Delete,
            from: Some(NodeRef::of(from)),
            to: None,
        }
    }

    pub fn modify<A: Noder, B: Noder>(from: &A, to: &B) -> Self {
        Self {
            action: Action::Modify,
            from: Some(NodeRef::of(from)),
            to: Some(NodeRef::of(to)),
        }
    }

    /// The path this change reports: the "to" side when present, else the
    /// "from" side.
    pub fn path(&self) -> &str {
        self.to
            .as_ref()
            .or(self.from.as_ref())
            .map(|n| n.path.as_str())
            .unwrap_or_default()
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.path())
    }
}
