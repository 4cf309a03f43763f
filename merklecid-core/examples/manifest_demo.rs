//! Demonstration of hashing content and rebuilding its CID from a manifest
//!
//! Run with: cargo run --example manifest_demo

use merklecid_core::{hash_content, parse_length, Manifest, CHUNK_SIZE};

fn main() {
    println!("=== Merkle CID Manifest Demo ===\n");

    // Three full chunks and a short tail
    let data: Vec<u8> = (0..3 * CHUNK_SIZE + 4096).map(|i| (i % 251) as u8).collect();

    println!("1. Hashing {} bytes...", data.len());
    let hashed = hash_content(&data).expect("Failed to hash content");
    println!("   CID:    {}", hashed.cid);
    println!("   Root:   {}", hex::encode(hashed.root));
    println!("   Leaves: {}", hashed.leaf_hashes.len());

    println!("\n2. Encoding manifest...");
    let manifest = hashed.manifest();
    let encoded = manifest.to_bytes();
    println!("   Binary: {} bytes", encoded.len());
    println!(
        "   JSON:   {}",
        manifest.to_json().expect("Failed to encode manifest")
    );

    println!("\n3. Decoding manifest and rebuilding the CID...");
    let decoded = Manifest::from_bytes(&encoded).expect("Failed to decode manifest");
    let rebuilt = decoded.cid().expect("Failed to rebuild CID");
    assert_eq!(rebuilt.cid, hashed.cid);
    println!("   ✓ CID matches: {}", rebuilt.cid);

    println!("\n4. Reading the length back out of the CID...");
    let length = parse_length(&rebuilt.cid.to_bytes()).expect("Failed to parse length");
    assert_eq!(length, data.len() as u64);
    println!("   ✓ Length: {} bytes", length);

    println!("\n=== Demo Complete ===");
}
