//! Content hashing entry points
//!
//! Chunks content, hashes each chunk, folds the leaves into a merkle root and
//! wraps the root plus content length into a CID. The same result can be
//! produced in one shot, from an async reader, or incrementally.

use cid::Cid;
use std::io::{self, Read};
use tokio::io::AsyncRead;

use crate::chunker::{Chunker, CHUNK_SIZE};
use crate::cid_merkle::build_cid;
use crate::error::{HashError, Result};
use crate::leaf::{self, LeafHash};
use crate::manifest::Manifest;
use crate::merkle::{combine, RootHash};

/// Result of hashing content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash {
    pub cid: Cid,
    pub root: RootHash,
    /// Per-chunk leaf hashes in chunk order
    pub leaf_hashes: Vec<LeafHash>,
    pub size: u64,
}

impl ContentHash {
    fn from_leaves(leaf_hashes: Vec<LeafHash>, size: u64) -> Result<Self> {
        let root = combine(&leaf_hashes)?;
        let cid = build_cid(&root, size)?;

        Ok(Self {
            cid,
            root,
            leaf_hashes,
            size,
        })
    }

    /// The manifest that reproduces this CID without the content
    pub fn manifest(&self) -> Manifest {
        Manifest::from_trusted(self.leaf_hashes.clone(), self.size)
    }

    /// Multihash digest bytes: root followed by the length suffix
    pub fn raw_hash(&self) -> &[u8] {
        self.cid.hash().digest()
    }
}

/// Single Keccak-256 digest of `content`, no chunking or merkle step
pub fn hash(content: &[u8]) -> LeafHash {
    leaf::hash(content)
}

/// Hash content on the calling thread
///
/// Empty content has no chunks and therefore no merkle root; it fails with
/// [`HashError::EmptyInput`].
pub fn hash_content(content: &[u8]) -> Result<ContentHash> {
    hash_content_with(content, 1)
}

/// Hash content with chunk hashing spread over `workers` threads
///
/// Output is identical to [`hash_content`] for any worker count.
pub fn hash_content_with(content: &[u8], workers: usize) -> Result<ContentHash> {
    let leaf_hashes = leaf::hash_chunks(content, workers);
    ContentHash::from_leaves(leaf_hashes, content.len() as u64)
}

/// Hash everything readable from `reader`, one chunk in memory at a time
pub async fn hash_reader<R: AsyncRead + Unpin>(reader: R) -> Result<ContentHash> {
    let mut chunker = Chunker::new(reader);
    let mut leaf_hashes = Vec::new();
    let mut size = 0u64;

    while let Some(chunk) = chunker.next_chunk().await? {
        size += chunk.len() as u64;
        leaf_hashes.push(leaf::hash(&chunk));
    }

    ContentHash::from_leaves(leaf_hashes, size)
}

/// Verify `content` hashes to `expected`
pub fn verify_content(content: &[u8], expected: &Cid) -> Result<()> {
    let computed = hash_content(content)?.cid;

    if &computed != expected {
        return Err(HashError::HashMismatch {
            expected: expected.to_string(),
            actual: computed.to_string(),
        });
    }

    Ok(())
}

/// Incremental content hasher
///
/// Input may arrive in pieces of any size; it is re-cut on `CHUNK_SIZE`
/// boundaries so the result matches [`hash_content`] on the concatenation.
pub struct StreamingHasher {
    pending: Vec<u8>,
    leaf_hashes: Vec<LeafHash>,
    expected_cid: Option<Cid>,
    bytes_processed: u64,
}

impl StreamingHasher {
    /// Create a new streaming hasher without expected CID
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(CHUNK_SIZE),
            leaf_hashes: Vec::new(),
            expected_cid: None,
            bytes_processed: 0,
        }
    }

    /// Create a new streaming hasher with expected CID
    pub fn new_with_cid(expected_cid: Cid) -> Self {
        Self {
            expected_cid: Some(expected_cid),
            ..Self::new()
        }
    }

    /// Feed more content
    pub fn update(&mut self, mut data: &[u8]) {
        self.bytes_processed += data.len() as u64;

        while !data.is_empty() {
            let take = (CHUNK_SIZE - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.pending.len() == CHUNK_SIZE {
                self.leaf_hashes.push(leaf::hash(&self.pending));
                self.pending.clear();
            }
        }
    }

    /// Read from a reader and update the hasher
    pub fn update_from_reader<R: Read>(&mut self, reader: &mut R) -> io::Result<usize> {
        let mut buffer = [0u8; 8192];
        let mut total_read = 0;

        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }

            self.update(&buffer[..n]);
            total_read += n;
        }

        Ok(total_read)
    }

    /// Finalize and get the computed hash
    pub fn finalize(mut self) -> Result<ContentHash> {
        if !self.pending.is_empty() {
            self.leaf_hashes.push(leaf::hash(&self.pending));
        }

        ContentHash::from_leaves(self.leaf_hashes, self.bytes_processed)
    }

    /// Finalize and verify against expected CID (if set)
    pub fn finalize_and_verify(mut self) -> Result<ContentHash> {
        let expected_cid = self.expected_cid.take();
        let computed = self.finalize()?;

        if let Some(expected) = expected_cid {
            if computed.cid != expected {
                return Err(HashError::HashMismatch {
                    expected: expected.to_string(),
                    actual: computed.cid.to_string(),
                });
            }
        }

        Ok(computed)
    }

    /// Get number of bytes processed
    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new()
    }
}
