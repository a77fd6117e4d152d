// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Certen Validator — Core Types
//!
//! Foundational crate for the cross-chain validator: domain entities (Intent,
//! Receipt, chained and governance proofs, batches, anchors, attestations,
//! write-back transactions), the error taxonomy, configuration, and the
//! repository trait contracts that higher-level crates implement.
//!
//! As the base crate, `certen-types` keeps its dependency list short and is
//! itself a dependency of almost every other crate in the workspace.

/// A hash is always exactly 32 bytes; hex encodings are lower-case only.
pub const HASH_LEN: usize = 32;

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::ProcessingError> = std::result::Result<T, E>;

/// 32-byte hash newtype with strict length/casing discipline.
pub mod hash;
/// The discovered intent and its four canonical blobs.
pub mod intent;
/// The atomic merkle receipt and its fold/verify primitives.
pub mod receipt;
/// Chained (L1/L2/L3) and governance (G0/G1/G2) proof entities.
pub mod proof;
/// Transaction records and batches awaiting anchoring.
pub mod batch;
/// The on-chain anchor entity and its wire invariants.
pub mod anchor;
/// BLS attestation bundles over execution results.
pub mod attestation;
/// The synthetic write-back transaction assembled for the source ledger.
pub mod writeback;
/// Confirmation-depth tracking for settled anchors.
pub mod confirmation;
/// The two-phase intent status map.
pub mod status;
/// A unified set of all error types used across the validator.
pub mod error;
/// Flat, `serde`-deserializable runtime configuration.
pub mod config;
/// Repository trait contracts (persistence is out of scope; traits are not).
pub mod repository;
