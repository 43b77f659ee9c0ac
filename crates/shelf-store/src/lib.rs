//! Content-addressed object storage for shelf.
//!
//! This crate implements a hash-keyed object store analogous to git's
//! `.git/objects/` directory. Snapshots of tracked subtrees are stored as
//! immutable objects identified by their BLAKE3 hash (domain-separated by
//! object kind).
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, symlink targets)
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- snapshot record linking a root tree to its parents
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`LooseObjectStore`] -- one zstd-compressed file per object on disk
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writing an object that already exists is a no-op.
//! 3. A failed write never leaves a partial object visible to readers.
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, ObjectKind, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
