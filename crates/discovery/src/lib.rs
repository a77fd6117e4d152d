// Path: crates/discovery/src/lib.rs
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # Certen Validator — Intent Discovery
//!
//! Polls the source ledger block by block, searches for tagged
//! transactions, classifies their canonical blobs, and hands completed
//! intents off to downstream batching/proof building.

/// Blob classification by top-level JSON key.
pub mod classify;
/// The per-block polling worker.
pub mod worker;

pub use classify::{classify_all, classify_blob, RawBlobs};
pub use worker::{DiscoveryWorker, IntentSink};
