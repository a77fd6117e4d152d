// Path: crates/crypto/src/sign/mod.rs
//! Signature algorithms: BLS12-381 for attestation aggregation, Ed25519 for
//! write-back signing.

pub mod bls;
pub mod eddsa;
pub mod traits;
