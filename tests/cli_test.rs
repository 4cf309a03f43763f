//! End-to-end tests for the merklecid binary

use assert_cmd::Command;
use predicates::prelude::*;

const GOLDEN_CID: &str = "bafk5sbbdnhnyy4iwzatcfvr3yteddvjx26twcgasybb3j37vx3ishpqeqsdacaac";

fn golden_content() -> Vec<u8> {
    let mut data = vec![b'a'; 127 * 1024];
    data.extend(vec![b'b'; 1025]);
    data
}

#[test]
fn test_hash_golden_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("golden.bin");
    let manifest = dir.path().join("golden.json");
    std::fs::write(&file, golden_content()).unwrap();

    Command::cargo_bin("merklecid")
        .unwrap()
        .arg("hash")
        .arg(&file)
        .arg("--manifest-out")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains(GOLDEN_CID))
        .stdout(predicate::str::contains("size: 131073"))
        .stdout(predicate::str::contains("chunks: 2"));

    Command::cargo_bin("merklecid")
        .unwrap()
        .arg("from-manifest")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains(GOLDEN_CID));
}

#[test]
fn test_parse_length() {
    Command::cargo_bin("merklecid")
        .unwrap()
        .args(["parse-length", GOLDEN_CID])
        .assert()
        .success()
        .stdout("131073\n");
}

#[test]
fn test_parse_length_rejects_garbage() {
    Command::cargo_bin("merklecid")
        .unwrap()
        .args(["parse-length", "definitely-not-a-cid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed CID"));
}

#[test]
fn test_verify() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("golden.bin");
    std::fs::write(&file, golden_content()).unwrap();

    Command::cargo_bin("merklecid")
        .unwrap()
        .arg("verify")
        .arg(&file)
        .arg(GOLDEN_CID)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));

    std::fs::write(&file, b"tampered").unwrap();
    Command::cargo_bin("merklecid")
        .unwrap()
        .arg("verify")
        .arg(&file)
        .arg(GOLDEN_CID)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hash mismatch"));
}

#[test]
fn test_hash_empty_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("empty.bin");
    std::fs::write(&file, b"").unwrap();

    Command::cargo_bin("merklecid")
        .unwrap()
        .arg("hash")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("zero leaves"));
}
