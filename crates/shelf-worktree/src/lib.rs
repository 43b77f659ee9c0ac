//! Working tree for shelf.
//!
//! Ties the object store, index, HEAD reference and differ to the live
//! filesystem under a set of tracked roots.
//!
//! # Key Types
//!
//! - [`Repository`] -- Explicit context: canonical root, config, store, index, HEAD
//! - [`Filesystem`] / [`OsFilesystem`] -- The filesystem collaborator
//! - [`FsNode`] -- Noder over the live filesystem
//! - [`Config`] -- Persisted tracked-root set
//!
//! # Status
//!
//! [`Repository::status`] runs two differ passes. Pass A compares the HEAD
//! commit's tree with the whole index and fills in the staging column;
//! it is skipped when nothing has been committed. Pass B compares the index
//! with the filesystem, one tracked root at a time, and fills in the
//! worktree column.

pub mod config;
pub mod error;
pub mod fs;
pub mod fs_node;
pub mod repository;
pub mod status;

pub use config::{Config, ConfigError};
pub use error::{WorktreeError, WorktreeResult};
pub use fs::{FileKind, Filesystem, FsError, Metadata, OsFilesystem};
pub use fs_node::FsNode;
pub use repository::{AddOutcome, Repository};
