//! Cryptographic primitives for shelf.
//!
//! Provides domain-separated BLAKE3 hashing. Every object kind hashes under
//! its own domain tag so a blob and a tree with identical bytes never share
//! an id.
//!
//! All crypto operations wrap established libraries -- no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
