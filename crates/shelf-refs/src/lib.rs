//! Reference management for shelf.
//!
//! shelf keeps exactly one mutable reference: HEAD, the id of the current
//! commit. Everything else in the object store is immutable, so HEAD is the
//! only value that moves when a snapshot is recorded.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`file`] -- [`FileRefStore`], HEAD persisted as a hex file

pub mod error;
pub mod file;
pub mod traits;

pub use error::{RefError, Result};
pub use file::FileRefStore;
pub use traits::RefStore;
