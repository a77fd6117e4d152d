// Path: crates/clients/src/lib.rs
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # Certen Validator — External Clients
//!
//! Trait contracts and `reqwest`-backed implementations for the three
//! external systems the validator observes or writes to: the source
//! ledger, the EVM target chain, and the consensus layer, plus the
//! peer-to-peer transport used for attestation signature collection.

/// Source ledger reads (block/transaction discovery, account/chain-entry
/// proofs) and synthetic write-back submission.
pub mod source_ledger;
/// Target EVM chain reads (block number, logs, calls) and writes.
pub mod target_chain;
/// Consensus layer commit/app-hash reads.
pub mod consensus;
/// Peer validator attestation-signature transport.
pub mod peer_transport;
/// Shared retry/backoff policy used by every client above.
pub mod retry;

pub use consensus::{Commit, ConsensusClient, HttpConsensusClient};
pub use peer_transport::{HttpPeerValidatorTransport, PartialAttestation, PeerValidatorTransport};
pub use source_ledger::{HttpSourceLedgerClient, SourceLedgerClient, TaggedTransaction};
pub use target_chain::{ContractEvent, JsonRpcTargetChainClient, TargetChainClient};
