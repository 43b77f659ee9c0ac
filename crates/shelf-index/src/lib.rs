//! Staging index for shelf.
//!
//! The index sits between committed history and the live filesystem: it
//! records, for every tracked file, the blob id, mode and stat metadata
//! captured at the last `add`.
//!
//! # Key Types
//!
//! - [`Index`] -- The in-memory staging area (BTreeMap-backed), persisted whole
//! - [`IndexEntry`] / [`StatInfo`] -- A tracked file and its stat snapshot
//! - [`IndexTree`] -- Directory view of the index with merkle directory ids
//! - [`Status`] / [`FileStatus`] / [`StatusCode`] -- Per-path status map
//!
//! All paths are relative to one canonical root, use `/` separators and
//! have no leading or trailing slash; see [`path`].

pub mod entry;
pub mod error;
pub mod index;
pub mod path;
pub mod status;
pub mod tree;

pub use entry::{IndexEntry, StatInfo};
pub use error::{IndexError, IndexResult};
pub use index::Index;
pub use status::{FileStatus, Status, StatusCode};
pub use tree::{IndexTree, IndexTreeKind};
