//! Process-wide multihash hasher registry
//!
//! Generic multihash consumers resolve a hash implementation by its numeric
//! code alone. The merkle tree hash (code 601) is not part of any standard
//! code table, so it is registered here explicitly through
//! [`register_merkle_tree_hash`], which is idempotent and safe to race. It
//! fails with [`HashError::HashTypeConflict`] if another hasher already holds
//! the code.

use multihash::Multihash;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, RwLock};
use tracing::{debug, warn};

use crate::cid_merkle::MERKLE_TREE_HASH_CODE;
use crate::error::{HashError, Result};
use crate::leaf::HASH_SIZE;
use crate::merkle::MerkleTreeHasher;

/// Incremental hasher resolvable by multihash code
pub trait MultihashHasher: Send {
    /// Feed more input
    fn update(&mut self, data: &[u8]);

    /// Produce the digest of everything fed since the last reset
    fn finalize(&mut self) -> Result<Vec<u8>>;

    /// Discard all input
    fn reset(&mut self);

    /// Digest size in bytes
    fn size(&self) -> usize;
}

/// Creates a fresh hasher instance
pub type HasherConstructor = fn() -> Box<dyn MultihashHasher>;

static REGISTRY: OnceLock<RwLock<HashMap<u64, HasherConstructor>>> = OnceLock::new();
/// Set once code 601 holds the merkle tree hasher; written under the registry lock
static MERKLE_REGISTERED: AtomicBool = AtomicBool::new(false);

fn registry() -> &'static RwLock<HashMap<u64, HasherConstructor>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a constructor for `code`
///
/// Returns `false` and leaves the existing entry untouched when `code` is
/// already registered.
pub fn register(code: u64, constructor: HasherConstructor) -> bool {
    let mut hashers = registry().write().unwrap_or_else(|e| e.into_inner());
    if hashers.contains_key(&code) {
        return false;
    }
    hashers.insert(code, constructor);
    true
}

/// Register the merkle tree hash under code 601
///
/// Repeated calls succeed once the merkle hasher holds the code. If some other
/// constructor took code 601 first, every call returns
/// [`HashError::HashTypeConflict`] and the existing entry is left in place.
pub fn register_merkle_tree_hash() -> Result<()> {
    if MERKLE_REGISTERED.load(Ordering::Acquire) {
        return Ok(());
    }

    let mut hashers = registry().write().unwrap_or_else(|e| e.into_inner());
    if MERKLE_REGISTERED.load(Ordering::Acquire) {
        return Ok(());
    }
    if hashers.contains_key(&MERKLE_TREE_HASH_CODE) {
        warn!(
            "Multihash 0x{:x} is held by another hasher, merkle tree hash not registered",
            MERKLE_TREE_HASH_CODE
        );
        return Err(HashError::HashTypeConflict(MERKLE_TREE_HASH_CODE));
    }

    hashers.insert(MERKLE_TREE_HASH_CODE, new_merkle_tree_hasher);
    MERKLE_REGISTERED.store(true, Ordering::Release);
    debug!("Registered merkle tree hash as multihash 0x{:x}", MERKLE_TREE_HASH_CODE);
    Ok(())
}

fn new_merkle_tree_hasher() -> Box<dyn MultihashHasher> {
    Box::new(MerkleTreeHasher::new())
}

/// Check whether a constructor exists for `code`
pub fn is_registered(code: u64) -> bool {
    registry()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .contains_key(&code)
}

/// Create a fresh hasher for `code`
pub fn lookup(code: u64) -> Result<Box<dyn MultihashHasher>> {
    let constructor = registry()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(&code)
        .copied()
        .ok_or(HashError::UnknownHashType(code))?;

    Ok(constructor())
}

/// Hash `data` with the hasher registered for `code`
pub fn digest(code: u64, data: &[u8]) -> Result<Multihash<64>> {
    let mut hasher = lookup(code)?;
    hasher.update(data);
    let bytes = hasher.finalize()?;

    Multihash::wrap(code, &bytes)
        .map_err(|e| HashError::MalformedCid(format!("Failed to create multihash: {}", e)))
}

impl MultihashHasher for MerkleTreeHasher {
    fn update(&mut self, data: &[u8]) {
        MerkleTreeHasher::update(self, data);
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        Ok(MerkleTreeHasher::finalize(self)?.to_vec())
    }

    fn reset(&mut self) {
        MerkleTreeHasher::reset(self);
    }

    fn size(&self) -> usize {
        HASH_SIZE
    }
}
