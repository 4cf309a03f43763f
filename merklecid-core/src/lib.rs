//! Merklecid Core
//!
//! Chunking, Keccak-256 leaf hashing, merkle combination and length-carrying
//! CID construction, plus manifest-only CID reconstruction.

pub mod chunker;
pub mod cid_merkle;
pub mod config;
pub mod context;
pub mod error;
pub mod hasher;
pub mod leaf;
pub mod length;
pub mod manifest;
pub mod merkle;
pub mod registry;
pub mod runtime;

pub use chunker::{split, Chunker, CHUNK_SIZE};
pub use cid_merkle::{
    build_cid, parse_cid, parse_cid_str, parse_length, parse_length_str, root_hash_of, CidPrefix,
    MERKLE_TREE_HASH_CODE, RAW_CODEC,
};
pub use config::{Command, Config, ConfigError, Invocation};
pub use context::{Context, TracingContext};
pub use error::{HashError, Result};
pub use hasher::{
    hash, hash_content, hash_content_with, hash_reader, verify_content, ContentHash,
    StreamingHasher,
};
pub use leaf::{hash_chunks, LeafHash, HASH_SIZE};
pub use manifest::{from_manifest, Manifest, ManifestHash};
pub use merkle::{combine, MerkleBackend, MerkleTree, MerkleTreeHasher, RootHash, Sha256MerkleBackend};
pub use registry::{register_merkle_tree_hash, MultihashHasher};
pub use runtime::{run, RuntimeError};

// Re-export Cid for external use
pub use cid::Cid;
