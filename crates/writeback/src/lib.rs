// Path: crates/writeback/src/lib.rs
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # Certen Validator — Write-Back Builder
//!
//! Assembles the synthetic write-back transaction that closes a proof
//! cycle, signs it with the validator's Ed25519 identity, submits it to
//! the source ledger, and watches for settlement.

/// Transaction assembly and Ed25519 signing.
pub mod builder;
/// Post-submission status polling.
pub mod watcher;

pub use builder::WriteBackBuilder;
pub use watcher::{WriteBackWatcher, WATCH_POLL_INTERVAL_SECS, WATCH_TIMEOUT_SECS};
