use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Name of a blob, tree or commit in the object store, and of a node in the
/// merkle comparison.
///
/// The all-zero value is a sentinel for "no hash available". Pruning
/// decisions go through [`ObjectId::same_content`], which never treats two
/// sentinels as equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

const WIDTH: usize = 32;

impl ObjectId {
    /// Plain BLAKE3 of `data`. Stored objects use the domain-separated
    /// hashers instead.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Wrap a digest produced elsewhere.
    pub fn from_hash(hash: [u8; WIDTH]) -> Self {
        Self(hash)
    }

    /// The sentinel id.
    pub const fn null() -> Self {
        Self([0u8; WIDTH])
    }

    pub fn is_null(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// True only when both ids are real and identical.
    pub fn same_content(&self, other: &ObjectId) -> bool {
        !self.is_null() && !other.is_null() && self.0 == other.0
    }

    pub fn as_bytes(&self) -> &[u8; WIDTH] {
        &self.0
    }

    /// Lowercase hex, as written to refs and object paths.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four bytes in hex, for log lines and the CLI.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse a full-length id. Surrounding whitespace is ignored so ref
    /// files with a trailing newline read back cleanly.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s.trim()).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; WIDTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: WIDTH,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("ObjectId(null)");
        }
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
