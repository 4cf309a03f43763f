//! Leaf hashing
//!
//! Each chunk is hashed independently with Keccak-256 (the pre-standard
//! Keccak padding, as used by Ethereum), so identical chunk bytes always
//! produce the same leaf regardless of position.

use sha3::{Digest, Keccak256};
use std::thread;

use crate::chunker::split;

/// Size of every leaf and merkle node in bytes
pub const HASH_SIZE: usize = 32;

/// Keccak-256 digest of one chunk
pub type LeafHash = [u8; HASH_SIZE];

/// Compute the Keccak-256 digest of `data`
pub fn hash(data: &[u8]) -> LeafHash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash every chunk of `content` in chunk order
///
/// Chunks are spread over up to `workers` scoped threads. Each worker owns a
/// contiguous run of output slots, so slot `i` always holds chunk `i`.
pub fn hash_chunks(content: &[u8], workers: usize) -> Vec<LeafHash> {
    let chunks: Vec<&[u8]> = split(content).collect();
    let workers = workers.clamp(1, chunks.len().max(1));

    if workers == 1 {
        return chunks.iter().map(|chunk| hash(chunk)).collect();
    }

    let mut leaves = vec![[0u8; HASH_SIZE]; chunks.len()];
    let per_worker = chunks.len().div_ceil(workers);

    thread::scope(|s| {
        for (slots, inputs) in leaves
            .chunks_mut(per_worker)
            .zip(chunks.chunks(per_worker))
        {
            s.spawn(move || {
                for (slot, chunk) in slots.iter_mut().zip(inputs) {
                    *slot = hash(chunk);
                }
            });
        }
    });

    leaves
}
