//! Integration tests for manifest-only reconstruction
//!
//! These tests verify that:
//! - CIDs rebuilt from stored leaf hashes equal direct hashing
//! - manifests survive being written to and read back from disk
//! - inconsistent manifests are rejected with the right error

use merklecid_core::{
    from_manifest, hash, hash_chunks, hash_content, hash_content_with, hash_reader, parse_length,
    register_merkle_tree_hash, registry, HashError, Manifest, CHUNK_SIZE, MERKLE_TREE_HASH_CODE,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing for tests
fn init_tracing() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

fn content(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

const SIZES: [usize; 8] = [
    1,
    1000,
    CHUNK_SIZE - 1,
    CHUNK_SIZE,
    CHUNK_SIZE + 1,
    2 * CHUNK_SIZE,
    3 * CHUNK_SIZE + 17,
    8 * CHUNK_SIZE,
];

#[test]
fn test_manifest_equivalence() {
    init_tracing();

    for len in SIZES {
        let data = content(len);
        let direct = hash_content(&data).expect("direct hashing");
        let rebuilt = from_manifest(&direct.leaf_hashes, len as u64).expect("rebuild");

        assert_eq!(rebuilt.cid, direct.cid, "CID differs for {} bytes", len);
        assert_eq!(rebuilt.root, direct.root, "root differs for {} bytes", len);
        assert_eq!(parse_length(&direct.cid.to_bytes()).unwrap(), len as u64);
    }
}

#[test]
fn test_parallel_hashing_equivalence() {
    let data = content(7 * CHUNK_SIZE + 3);
    let expected = hash_content(&data).unwrap();

    for workers in [1, 2, 3, 8] {
        assert_eq!(hash_content_with(&data, workers).unwrap(), expected);
    }
}

#[test]
fn test_leaf_hashes_without_merkle_step() {
    let data = content(2 * CHUNK_SIZE + 9);
    let leaves = hash_chunks(&data, 2);

    assert_eq!(leaves.len(), 3);
    assert_eq!(leaves[2], hash(&data[2 * CHUNK_SIZE..]));
    assert_eq!(leaves, hash_content(&data).unwrap().leaf_hashes);
}

#[test]
fn test_concurrent_independent_calls() {
    let inputs: Vec<Vec<u8>> = (1..=6).map(|n| content(n * CHUNK_SIZE / 2 + n)).collect();
    let expected: Vec<_> = inputs.iter().map(|d| hash_content(d).unwrap().cid).collect();

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|data| std::thread::spawn(move || hash_content_with(&data, 2).unwrap().cid))
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_size_hash_count_mismatch() {
    let leaves = hash_content(&content(3 * CHUNK_SIZE)).unwrap().leaf_hashes;
    let chunk = CHUNK_SIZE as u64;

    for size in [1, 2 * chunk, 3 * chunk + 1, u64::MAX] {
        assert!(
            matches!(
                from_manifest(&leaves, size),
                Err(HashError::SizeHashCountMismatch { .. })
            ),
            "size {} should not match 3 leaves",
            size
        );
    }
}

#[test]
fn test_hash_length_guard() {
    let mut hashes: Vec<Vec<u8>> = hash_content(&content(2 * CHUNK_SIZE))
        .unwrap()
        .leaf_hashes
        .iter()
        .map(|h| h.to_vec())
        .collect();
    hashes[1].push(0);

    assert!(matches!(
        from_manifest(&hashes, 2 * CHUNK_SIZE as u64),
        Err(HashError::InvalidHashLength { index: 1, len: 33 })
    ));
}

#[test]
fn test_manifest_file_roundtrip() {
    let data = content(2 * CHUNK_SIZE + 5);
    let direct = hash_content(&data).unwrap();

    let dir = tempfile::tempdir().expect("temp dir");

    let json_path = dir.path().join("manifest.json");
    std::fs::write(&json_path, direct.manifest().to_json().unwrap()).unwrap();
    let from_json = Manifest::from_json(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(from_json.cid().unwrap().cid, direct.cid);

    let bin_path = dir.path().join("manifest.bin");
    std::fs::write(&bin_path, direct.manifest().to_bytes()).unwrap();
    let from_bin = Manifest::from_bytes(&std::fs::read(&bin_path).unwrap()).unwrap();
    assert_eq!(from_bin, from_json);
}

#[test]
fn test_manifest_json_is_plain_hex() {
    let direct = hash_content(&content(10)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&direct.manifest().to_json().unwrap()).unwrap();

    assert_eq!(json["size"], 10);
    assert_eq!(json["leaf_hashes"][0], hex::encode(direct.leaf_hashes[0]));
}

#[tokio::test]
async fn test_hash_reader_from_file() {
    let data = content(3 * CHUNK_SIZE + 1);
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("content.bin");
    tokio::fs::write(&path, &data).await.unwrap();

    let file = tokio::fs::File::open(&path).await.unwrap();
    let streamed = hash_reader(file).await.unwrap();

    assert_eq!(streamed, hash_content(&data).unwrap());
}

#[test]
fn test_registry_resolves_merkle_hash() {
    register_merkle_tree_hash().unwrap();

    let leaves = hash_content(&content(3 * CHUNK_SIZE)).unwrap();
    let mut hasher = registry::lookup(MERKLE_TREE_HASH_CODE).unwrap();
    for leaf in &leaves.leaf_hashes {
        hasher.update(leaf);
    }

    assert_eq!(hasher.finalize().unwrap(), leaves.root.to_vec());
}
