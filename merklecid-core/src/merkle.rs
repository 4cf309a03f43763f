//! Merkle combination of leaf hashes
//!
//! The tree is built bottom-up from the ordered leaf hashes:
//! - adjacent nodes are paired left to right and compressed into a parent
//! - a level with an odd node count duplicates its last node, so the final
//!   parent is `compress(last, last)`
//! - the leaf level is always compressed at least once, so a single leaf `h`
//!   yields `compress(h, h)` rather than `h` itself
//!
//! The canonical compression is `SHA256(left || right)` over the raw 64 bytes
//! with no domain separation byte.

use sha2::{Digest, Sha256};

use crate::error::{HashError, Result};
use crate::leaf::{LeafHash, HASH_SIZE};

/// Root of a merkle tree over leaf hashes
pub type RootHash = [u8; HASH_SIZE];

/// Pairwise node compression used while folding a level
pub trait MerkleBackend {
    /// Combine a left and right child into their parent
    fn compress(&self, left: &[u8; HASH_SIZE], right: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE];
}

/// SHA-256 over the raw concatenation of both children
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256MerkleBackend;

impl MerkleBackend for Sha256MerkleBackend {
    fn compress(&self, left: &[u8; HASH_SIZE], right: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
        let mut hasher = Sha256::new();
        hasher.update(left);
        hasher.update(right);
        hasher.finalize().into()
    }
}

/// Merkle tree over leaf hashes
///
/// Keeps every layer so callers can inspect depth and leaves after building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// layers[0] = leaves, layers[last] = [root]
    layers: Vec<Vec<[u8; HASH_SIZE]>>,
}

impl MerkleTree {
    /// Build a tree with the canonical SHA-256 backend
    pub fn new(leaves: Vec<LeafHash>) -> Result<Self> {
        Self::with_backend(&Sha256MerkleBackend, leaves)
    }

    /// Build a tree with an explicit backend
    pub fn with_backend<B: MerkleBackend + ?Sized>(
        backend: &B,
        leaves: Vec<LeafHash>,
    ) -> Result<Self> {
        if leaves.is_empty() {
            return Err(HashError::EmptyInput);
        }

        let mut layers = Vec::new();
        let mut current = leaves;
        loop {
            let next = Self::build_next_layer(backend, &current);
            layers.push(current);
            if next.len() == 1 {
                layers.push(next);
                break;
            }
            current = next;
        }

        Ok(Self { layers })
    }

    fn build_next_layer<B: MerkleBackend + ?Sized>(
        backend: &B,
        current: &[[u8; HASH_SIZE]],
    ) -> Vec<[u8; HASH_SIZE]> {
        current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => backend.compress(left, right),
                [odd] => backend.compress(odd, odd),
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect()
    }

    /// The root hash
    pub fn root(&self) -> RootHash {
        // Construction guarantees a final layer holding exactly one node
        self.layers[self.layers.len() - 1][0]
    }

    /// The leaf layer in original order
    pub fn leaves(&self) -> &[LeafHash] {
        &self.layers[0]
    }

    /// Get the number of leaves in the tree
    pub fn leaves_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Get the depth of the tree (number of layers - 1)
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }
}

/// Fold ordered leaf hashes into a root with the canonical backend
pub fn combine(leaves: &[LeafHash]) -> Result<RootHash> {
    Ok(MerkleTree::new(leaves.to_vec())?.root())
}

/// Streaming merkle hasher over concatenated 32-byte leaves
///
/// Bytes written are read back as consecutive leaves; a trailing partial leaf
/// is zero-padded to 32 bytes before the tree is built.
#[derive(Debug, Clone, Default)]
pub struct MerkleTreeHasher {
    buf: Vec<u8>,
}

impl MerkleTreeHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw leaf bytes
    pub fn update(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Build the tree over everything written so far
    pub fn finalize(&self) -> Result<RootHash> {
        let leaves: Vec<LeafHash> = self
            .buf
            .chunks(HASH_SIZE)
            .map(|piece| {
                let mut leaf = [0u8; HASH_SIZE];
                leaf[..piece.len()].copy_from_slice(piece);
                leaf
            })
            .collect();

        combine(&leaves)
    }

    /// Discard written bytes
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
