// Path: crates/crypto/src/lib.rs
//! # Certen Validator Cryptography
//!
//! BLS12-381 attestation signing/aggregation and Ed25519 write-back
//! signing, built on `dcrypt` primitives. Panics are disallowed in
//! non-test code; every fallible operation returns `CryptoError`.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

pub mod algorithms;
pub mod error;
pub mod sign;
