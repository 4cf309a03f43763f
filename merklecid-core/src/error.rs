//! Error taxonomy shared by every hashing operation.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Cannot build a merkle tree from zero leaves")]
    EmptyInput,

    #[error("Declared size must be greater than 0")]
    InvalidSize,

    #[error("Leaf hash list must not be empty")]
    EmptyHashes,

    #[error("Leaf hash {index} is {len} bytes, expected 32")]
    InvalidHashLength { index: usize, len: usize },

    #[error("{hashes} leaf hashes cannot describe {size} bytes of content")]
    SizeHashCountMismatch { hashes: usize, size: u64 },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Malformed CID: {0}")]
    MalformedCid(String),

    #[error("Unknown hash type: 0x{0:x}")]
    UnknownHashType(u64),

    #[error("Hash type 0x{0:x} is already registered to another hasher")]
    HashTypeConflict(u64),

    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, HashError>;
