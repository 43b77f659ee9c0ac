//! Tree differ for shelf.
//!
//! Compares two hierarchical trees exposed through the [`Noder`] trait and
//! produces an ordered list of [`Change`]s. Subtrees whose hashes match on
//! both sides are skipped without descending.
//!
//! # Key Types
//!
//! - [`Noder`] -- The capability set a tree node exposes to the differ
//! - [`IndexNode`] -- Noder over the staging index
//! - [`TreeNode`] -- Noder over a committed tree in the object store
//! - [`Change`] / [`Action`] / [`NodeRef`] -- Differ output
//! - [`diff_tree`] / [`diff_roots`] -- Single-root and multi-root diffing

pub mod change;
pub mod error;
pub mod index_node;
pub mod noder;
pub mod tree_diff;
pub mod tree_node;

pub use change::{Action, Change, NodeRef};
pub use error::{DiffError, DiffResult};
pub use index_node::IndexNode;
pub use noder::{leaf_hash, Noder};
pub use tree_diff::{diff_roots, diff_tree};
pub use tree_node::TreeNode;
