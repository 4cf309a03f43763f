//! Length-carrying merkle CIDs
//!
//! A content identifier here is a CIDv1 with the raw codec whose multihash
//! uses the custom merkle-tree code. The digest is the 32-byte merkle root
//! followed by the minimal little-endian content length:
//!
//! ```text
//! [version=1][codec=0x55][hash type=601][hash len=32+n][root: 32][length: n]
//! ```
//!
//! All prefix fields are unsigned varints.

use cid::Cid;
use multihash::Multihash;

use crate::error::{HashError, Result};
use crate::leaf::HASH_SIZE;
use crate::length;
use crate::merkle::RootHash;

/// CID version used for every identifier
pub const CID_VERSION: u64 = 1;

/// Multicodec for raw binary content
pub const RAW_CODEC: u64 = 0x55;

/// Multihash code of the merkle tree hash (600 + 1)
pub const MERKLE_TREE_HASH_CODE: u64 = 601;

/// Decoded CID prefix: everything before the digest bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidPrefix {
    pub version: u64,
    pub codec: u64,
    pub hash_type: u64,
    pub hash_len: u64,
}

impl CidPrefix {
    /// Prefix for a merkle CID whose digest is `hash_len` bytes
    pub fn merkle(hash_len: usize) -> Self {
        Self {
            version: CID_VERSION,
            codec: RAW_CODEC,
            hash_type: MERKLE_TREE_HASH_CODE,
            hash_len: hash_len as u64,
        }
    }

    /// Encode as four consecutive unsigned varints
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = unsigned_varint::encode::u64_buffer();
        for field in [self.version, self.codec, self.hash_type, self.hash_len] {
            out.extend_from_slice(unsigned_varint::encode::u64(field, &mut buf));
        }
        out
    }

    /// Decode the prefix, returning it with the remaining digest bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8])> {
        let (version, rest) = read_varint(bytes, "version")?;
        let (codec, rest) = read_varint(rest, "codec")?;
        let (hash_type, rest) = read_varint(rest, "hash type")?;
        let (hash_len, rest) = read_varint(rest, "hash length")?;

        Ok((
            Self {
                version,
                codec,
                hash_type,
                hash_len,
            },
            rest,
        ))
    }
}

fn read_varint<'a>(bytes: &'a [u8], field: &str) -> Result<(u64, &'a [u8])> {
    unsigned_varint::decode::u64(bytes)
        .map_err(|e| HashError::MalformedCid(format!("Failed to read {}: {}", field, e)))
}

/// Build the CID for a merkle root and the content length it covers
pub fn build_cid(root: &RootHash, length: u64) -> Result<Cid> {
    let mut digest = Vec::with_capacity(HASH_SIZE + length::MAX_SUFFIX_LEN);
    digest.extend_from_slice(root);
    digest.extend_from_slice(&length::encode(length));

    let mh = Multihash::wrap(MERKLE_TREE_HASH_CODE, &digest)
        .map_err(|e| HashError::MalformedCid(format!("Failed to create multihash: {}", e)))?;

    Ok(Cid::new_v1(RAW_CODEC, mh))
}

/// Split a binary merkle CID into its prefix, root and encoded length
fn split_digest(cid_bytes: &[u8]) -> Result<(CidPrefix, &[u8], &[u8])> {
    let (prefix, digest) = CidPrefix::from_bytes(cid_bytes)?;

    if prefix.version != CID_VERSION {
        return Err(HashError::MalformedCid(format!(
            "Unsupported CID version {}",
            prefix.version
        )));
    }

    if prefix.hash_type != MERKLE_TREE_HASH_CODE {
        return Err(HashError::UnknownHashType(prefix.hash_type));
    }

    if digest.len() < HASH_SIZE {
        return Err(HashError::MalformedCid(format!(
            "Digest has {} bytes, need at least {}",
            digest.len(),
            HASH_SIZE
        )));
    }

    if digest.len() as u64 != prefix.hash_len {
        return Err(HashError::MalformedCid(format!(
            "Declared hash length {} but {} bytes follow the prefix",
            prefix.hash_len,
            digest.len()
        )));
    }

    let (root, suffix) = digest.split_at(HASH_SIZE);
    Ok((prefix, root, suffix))
}

/// Recover the content length encoded in binary CID bytes
pub fn parse_length(cid_bytes: &[u8]) -> Result<u64> {
    let (_, _, suffix) = split_digest(cid_bytes)?;

    length::decode(suffix).ok_or_else(|| {
        HashError::MalformedCid(format!(
            "Length suffix has {} bytes, at most {} allowed",
            suffix.len(),
            length::MAX_SUFFIX_LEN
        ))
    })
}

/// Recover the content length from a CID in text form
pub fn parse_length_str(s: &str) -> Result<u64> {
    let cid = parse_cid_str(s)?;
    parse_length(&cid.to_bytes())
}

/// Extract the merkle root from a CID
pub fn root_hash_of(cid: &Cid) -> Result<RootHash> {
    let bytes = cid.to_bytes();
    let (_, root, _) = split_digest(&bytes)?;

    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(root);
    Ok(out)
}

/// Parse a CID from bytes
pub fn parse_cid(bytes: &[u8]) -> Result<Cid> {
    Cid::try_from(bytes).map_err(|e| HashError::MalformedCid(e.to_string()))
}

/// Parse a CID from string
pub fn parse_cid_str(s: &str) -> Result<Cid> {
    s.parse().map_err(|e| HashError::MalformedCid(format!("{}", e)))
}
