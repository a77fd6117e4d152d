// Path: crates/crypto/src/algorithms/hash/tests.rs
use super::*;

#[test]
fn sha256_is_32_bytes() {
    let digest = sha256(b"certen").unwrap();
    assert_eq!(digest.len(), 32);
}

#[test]
fn sha256_is_deterministic() {
    let a = sha256(b"certen").unwrap();
    let b = sha256(b"certen").unwrap();
    assert_eq!(a, b);
}

#[test]
fn sha512_is_64_bytes() {
    let digest = sha512(b"certen").unwrap();
    assert_eq!(digest.len(), 64);
}
