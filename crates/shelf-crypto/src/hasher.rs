use shelf_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"shelf-blob-v1"`) that is
/// prepended to every hash computation. This prevents cross-type hash
/// collisions: a blob and a tree with identical bytes produce different ids.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects (file contents, symlink targets).
    pub const BLOB: Self = Self {
        domain: "shelf-blob-v1",
    };
    /// Hasher for tree objects.
    pub const TREE: Self = Self {
        domain: "shelf-tree-v1",
    };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self {
        domain: "shelf-commit-v1",
    };
    /// Hasher for leaf tree-node identities (blob id + file mode).
    pub const ENTRY: Self = Self {
        domain: "shelf-entry-v1",
    };

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = self.start();
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash several byte slices as one message, with domain separation.
    ///
    /// Every part is length-prefixed, including a lone one, so no two part
    /// lists encode the same. A domain uses either this or [`hash`](Self::hash),
    /// never both.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> ObjectId {
        let mut hasher = self.start();
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(ContentHasher::BLOB.hash(data), ContentHasher::BLOB.hash(data));
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let blob_hash = ContentHasher::BLOB.hash(data);
        let tree_hash = ContentHasher::TREE.hash(data);
        let commit_hash = ContentHasher::COMMIT.hash(data);
        assert_ne!(blob_hash, tree_hash);
        assert_ne!(blob_hash, commit_hash);
        assert_ne!(tree_hash, commit_hash);
    }

    #[test]
    fn parts_are_length_prefixed() {
        let a = ContentHasher::ENTRY.hash_parts(&[b"ab", b"c"]);
        let b = ContentHasher::ENTRY.hash_parts(&[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn single_part_is_length_prefixed_too() {
        let data = b"one part";
        assert_ne!(
            ContentHasher::TREE.hash_parts(&[data]),
            ContentHasher::TREE.hash(data)
        );
    }

    #[test]
    fn single_part_never_collides_with_a_split() {
        // A lone part whose bytes spell out a two-part encoding.
        let mut forged = Vec::new();
        forged.extend_from_slice(&2u64.to_le_bytes());
        forged.extend_from_slice(b"ab");
        forged.extend_from_slice(&1u64.to_le_bytes());
        forged.extend_from_slice(b"c");
        assert_ne!(
            ContentHasher::ENTRY.hash_parts(&[&forged]),
            ContentHasher::ENTRY.hash_parts(&[b"ab", b"c"])
        );
    }

    proptest! {
        #[test]
        fn hashes_are_never_null(data in proptest::collection::vec(any::<u8>(), 0..128)) {
            prop_assert!(!ContentHasher::BLOB.hash(&data).is_null());
        }
    }
}
