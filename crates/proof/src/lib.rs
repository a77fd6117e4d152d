// Path: crates/proof/src/lib.rs
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # Certen Validator — Proof Builders
//!
//! Builds the chained L1/L2/L3 cryptographic proof for a discovered
//! transaction, and the tiered G0/G1/G2 governance proof that rides
//! alongside it.

/// L1 (partition anchor) / L2 (DN root) / L3 (consensus finality)
/// stitching and trust-level derivation.
pub mod chained;
/// G0/G1/G2 governance proof tiers.
pub mod governance;

pub use chained::ChainedProofBuilder;
pub use governance::{AuthorityContext, GovernanceProofBuilder};
