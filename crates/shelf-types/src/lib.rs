//! Foundation types for shelf.
//!
//! Every other shelf crate depends on `shelf-types` for the object
//! identifier that keys the object store, the index and the tree differ.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash), with the
//!   all-zero [`ObjectId::null`] doubling as the "hash unavailable" sentinel
//! - [`TypeError`] -- Parse failures for identifiers

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::ObjectId;
