// Path: crates/codec/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Certen Validator — Commitment Codec
//!
//! Canonical JSON serialization and the derived operation-id and
//! anchor commitments (operation, cross-chain, governance).

/// RFC8785-style JSON canonicalization.
pub mod canonical;
/// Operation-id and commitment derivation.
pub mod commitment;
