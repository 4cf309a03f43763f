//! Manifest-only CID reconstruction
//!
//! A manifest is the ordered list of leaf hashes plus the content size. It is
//! enough to rebuild the CID without touching the content again, provided the
//! size is consistent with the number of 128KiB chunks that were hashed.

use cid::Cid;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};

use crate::chunker::CHUNK_SIZE;
use crate::cid_merkle::build_cid;
use crate::error::{HashError, Result};
use crate::leaf::{LeafHash, HASH_SIZE};
use crate::merkle::{combine, RootHash};

/// Result of rebuilding a CID from a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestHash {
    pub cid: Cid,
    pub root: RootHash,
}

/// Validate leaf hashes against a declared content size
///
/// Checks run in a fixed order, each with its own error:
/// size, emptiness, per-hash length, then chunk count against size.
pub fn validate<H: AsRef<[u8]>>(hashes: &[H], declared_size: u64) -> Result<Vec<LeafHash>> {
    if declared_size == 0 {
        return Err(HashError::InvalidSize);
    }

    if hashes.is_empty() {
        return Err(HashError::EmptyHashes);
    }

    let mut leaves = Vec::with_capacity(hashes.len());
    for (index, hash) in hashes.iter().enumerate() {
        let hash = hash.as_ref();
        let leaf: LeafHash = hash.try_into().map_err(|_| HashError::InvalidHashLength {
            index,
            len: hash.len(),
        })?;
        leaves.push(leaf);
    }

    // (n - 1) * CHUNK_SIZE < size <= n * CHUNK_SIZE
    let n = hashes.len() as u128;
    let size = u128::from(declared_size);
    let chunk = CHUNK_SIZE as u128;
    if !((n - 1) * chunk < size && size <= n * chunk) {
        return Err(HashError::SizeHashCountMismatch {
            hashes: hashes.len(),
            size: declared_size,
        });
    }

    Ok(leaves)
}

/// Rebuild the CID from stored leaf hashes and the declared content size
pub fn from_manifest<H: AsRef<[u8]>>(hashes: &[H], declared_size: u64) -> Result<ManifestHash> {
    let leaves = validate(hashes, declared_size)?;
    let root = combine(&leaves)?;
    let cid = build_cid(&root, declared_size)?;

    Ok(ManifestHash { cid, root })
}

/// Validated leaf hash list with its content size
///
/// Serializes with hex-encoded hashes so it can live in JSON or TOML files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ManifestRepr", into = "ManifestRepr")]
pub struct Manifest {
    size: u64,
    leaf_hashes: Vec<LeafHash>,
}

#[derive(Serialize, Deserialize)]
struct ManifestRepr {
    size: u64,
    leaf_hashes: Vec<String>,
}

impl Manifest {
    /// Create a manifest, rejecting inconsistent input
    pub fn new(leaf_hashes: Vec<LeafHash>, size: u64) -> Result<Self> {
        validate(&leaf_hashes, size)?;
        Ok(Self { size, leaf_hashes })
    }

    /// Leaf hashes produced by hashing, already consistent with `size`
    pub(crate) fn from_trusted(leaf_hashes: Vec<LeafHash>, size: u64) -> Self {
        Self { size, leaf_hashes }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn leaf_hashes(&self) -> &[LeafHash] {
        &self.leaf_hashes
    }

    /// Rebuild the CID this manifest describes
    pub fn cid(&self) -> Result<ManifestHash> {
        from_manifest(&self.leaf_hashes, self.size)
    }

    /// Serialize to the compact binary form
    ///
    /// Format: [size: u64][count: u32][hash1: 32 bytes][hash2: 32 bytes]...
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(12 + self.leaf_hashes.len() * HASH_SIZE);

        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.extend_from_slice(&(self.leaf_hashes.len() as u32).to_le_bytes());
        for hash in &self.leaf_hashes {
            buf.extend_from_slice(hash);
        }

        buf
    }

    /// Deserialize from the compact binary form
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let mut size_bytes = [0u8; 8];
        cursor
            .read_exact(&mut size_bytes)
            .map_err(|e| HashError::InvalidManifest(format!("Failed to read size: {}", e)))?;
        let size = u64::from_le_bytes(size_bytes);

        let mut count_bytes = [0u8; 4];
        cursor
            .read_exact(&mut count_bytes)
            .map_err(|e| HashError::InvalidManifest(format!("Failed to read count: {}", e)))?;
        let count = u32::from_le_bytes(count_bytes) as usize;

        let expected = count.checked_mul(HASH_SIZE).ok_or_else(|| {
            HashError::InvalidManifest(format!("Hash count {} is too large", count))
        })?;
        let remaining = data.len() - cursor.position() as usize;
        if remaining != expected {
            return Err(HashError::InvalidManifest(format!(
                "Expected {} hash bytes, found {}",
                expected, remaining
            )));
        }

        let mut leaf_hashes = Vec::with_capacity(count);
        for _ in 0..count {
            let mut hash = [0u8; HASH_SIZE];
            cursor
                .read_exact(&mut hash)
                .map_err(|e| HashError::InvalidManifest(format!("Failed to read hash: {}", e)))?;
            leaf_hashes.push(hash);
        }

        Self::new(leaf_hashes, size)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| HashError::InvalidManifest(e.to_string()))
    }

    /// Deserialize from JSON, validating the content
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| HashError::InvalidManifest(e.to_string()))
    }
}

impl TryFrom<ManifestRepr> for Manifest {
    type Error = HashError;

    fn try_from(repr: ManifestRepr) -> Result<Self> {
        let raw = repr
            .leaf_hashes
            .iter()
            .map(|h| {
                hex::decode(h).map_err(|e| HashError::InvalidManifest(format!("{}: {}", h, e)))
            })
            .collect::<Result<Vec<Vec<u8>>>>()?;

        let leaf_hashes = validate(&raw, repr.size)?;
        Ok(Self {
            size: repr.size,
            leaf_hashes,
        })
    }
}

impl From<Manifest> for ManifestRepr {
    fn from(manifest: Manifest) -> Self {
        Self {
            size: manifest.size,
            leaf_hashes: manifest.leaf_hashes.iter().map(hex::encode).collect(),
        }
    }
}
