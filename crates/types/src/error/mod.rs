// Path: crates/types/src/error/mod.rs
//! The error taxonomy for the certen validator.
//!
//! One enum per failure family, matching the classification in the system
//! design: configuration failures are fatal at startup, integrity and policy
//! failures are always surfaced, transient failures are retried locally and
//! escalate to a `ProcessingError` once retries are exhausted.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Fatal at startup: missing endpoints, invalid keys, malformed contract address.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required endpoint URL was not set.
    #[error("missing required endpoint: {0}")]
    MissingEndpoint(&'static str),
    /// A key material reference could not be resolved or parsed.
    #[error("invalid key material for {field}: {reason}")]
    InvalidKey {
        /// Name of the configuration field.
        field: &'static str,
        /// Human-readable parse/validation failure.
        reason: String,
    },
    /// The anchor contract address is not a well-formed 20-byte address.
    #[error("malformed contract address: {0}")]
    MalformedContractAddress(String),
    /// A config file could not be read or parsed.
    #[error("failed to load config from {path}: {reason}")]
    Load {
        /// Path that failed to load.
        path: String,
        /// Underlying parse error.
        reason: String,
    },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingEndpoint(_) => "CONFIG_MISSING_ENDPOINT",
            Self::InvalidKey { .. } => "CONFIG_INVALID_KEY",
            Self::MalformedContractAddress(_) => "CONFIG_BAD_CONTRACT_ADDRESS",
            Self::Load { .. } => "CONFIG_LOAD_FAILED",
        }
    }
}

/// Receipt fold mismatch, stitching byte-inequality, state-root disagreement.
/// Never retried; the affected intent is marked `failed`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// A hash was not exactly 32 bytes.
    #[error("length discipline violated: expected {expected} bytes, got {got}")]
    LengthDiscipline {
        /// Required byte length (always 32 in this system).
        expected: usize,
        /// Observed byte length.
        got: usize,
    },
    /// A hex string used non-canonical (upper-case or malformed) encoding.
    #[error("non-canonical hex encoding: {0}")]
    NonCanonicalHex(String),
    /// Folding a receipt's entries over `start` did not reach `anchor`.
    #[error("receipt fold mismatch: expected anchor {expected}, got {got}")]
    FoldMismatch {
        /// The receipt's declared anchor, hex-encoded.
        expected: String,
        /// The value produced by folding, hex-encoded.
        got: String,
    },
    /// `L1.anchor != L2.start` at the byte level.
    #[error("stitching mismatch: L1.anchor {l1_anchor} != L2.start {l2_start}")]
    StitchMismatch {
        /// L1's anchor, hex-encoded.
        l1_anchor: String,
        /// L2's start, hex-encoded.
        l2_start: String,
    },
    /// A structural invariant on an entity was violated (e.g. empty scope).
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
    /// The on-chain stored merkle root did not equal the locally computed root.
    #[error("merkle root mismatch: expected {expected}, stored {stored}")]
    RootMismatch {
        /// Locally pre-computed root, hex-encoded.
        expected: String,
        /// Root read back from the chain, hex-encoded.
        stored: String,
    },
}

impl ErrorCode for IntegrityError {
    fn code(&self) -> &'static str {
        match self {
            Self::LengthDiscipline { .. } => "INTEGRITY_LENGTH_DISCIPLINE",
            Self::NonCanonicalHex(_) => "INTEGRITY_NON_CANONICAL_HEX",
            Self::FoldMismatch { .. } => "INTEGRITY_FOLD_MISMATCH",
            Self::StitchMismatch { .. } => "INTEGRITY_STITCH_MISMATCH",
            Self::InvariantViolated(_) => "INTEGRITY_INVARIANT_VIOLATED",
            Self::RootMismatch { .. } => "INTEGRITY_ROOT_MISMATCH",
        }
    }
}

/// Signature or threshold failure at L3 consensus binding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// A validator signature over the canonical vote failed to verify.
    #[error("invalid validator signature")]
    InvalidSignature,
    /// Aggregated voting power did not reach the 2/3 threshold.
    #[error("quorum not met: {signed}/{total} voting power")]
    QuorumNotMet {
        /// Signed voting power observed.
        signed: u128,
        /// Total known voting power.
        total: u128,
    },
    /// The bound root did not equal the layer's anchor.
    #[error("root binding mismatch")]
    RootBindingMismatch,
    /// The consensus endpoint could not be reached after retries.
    #[error("consensus endpoint unreachable: {0}")]
    Unreachable(String),
}

impl ErrorCode for ConsensusError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "CONSENSUS_INVALID_SIGNATURE",
            Self::QuorumNotMet { .. } => "CONSENSUS_QUORUM_NOT_MET",
            Self::RootBindingMismatch => "CONSENSUS_ROOT_BINDING_MISMATCH",
            Self::Unreachable(_) => "CONSENSUS_UNREACHABLE",
        }
    }
}

/// I/O, RPC, or peer-transport failure. Retried with exponential backoff;
/// escalates to `ProcessingError` once the per-operation retry budget is spent.
#[derive(Debug, Error, Clone)]
pub enum TransientError {
    /// The RPC call failed (connection, timeout, non-2xx).
    #[error("rpc call to {endpoint} failed: {reason}")]
    Rpc {
        /// The endpoint that was called.
        endpoint: String,
        /// Underlying failure description.
        reason: String,
    },
    /// A peer-validator transport request timed out or was refused.
    #[error("peer transport error: {0}")]
    PeerTransport(String),
    /// The retry budget for this operation was exhausted.
    #[error("retry budget exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last underlying error observed.
        last_error: String,
    },
}

impl ErrorCode for TransientError {
    fn code(&self) -> &'static str {
        match self {
            Self::Rpc { .. } => "TRANSIENT_RPC",
            Self::PeerTransport(_) => "TRANSIENT_PEER_TRANSPORT",
            Self::RetriesExhausted { .. } => "TRANSIENT_RETRIES_EXHAUSTED",
        }
    }
}

/// Non-integrity failure during intent processing. The status machine
/// transitions `in_progress -> failed`, permitting retry on a later poll.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// An underlying integrity failure (not retryable).
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    /// An underlying consensus failure.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),
    /// A transient failure whose retry budget was exhausted.
    #[error(transparent)]
    Transient(#[from] TransientError),
    /// A policy failure (threshold, governance downgrade, expiry).
    #[error(transparent)]
    Policy(#[from] PolicyError),
    /// The transaction carried no recognizable canonical blobs.
    #[error("transaction is not a recognizable canonical intent")]
    NonCanonical,
    /// A leaf hash was already present in the target batch.
    #[error("duplicate leaf {leaf} in batch for {group_key}")]
    DuplicateLeaf {
        /// The colliding leaf hash, hex-encoded.
        leaf: String,
        /// The batch grouping key the duplicate was submitted to.
        group_key: String,
    },
    /// Catch-all for conditions not covered by a more specific variant.
    #[error("processing failed: {0}")]
    Other(String),
}

impl ErrorCode for ProcessingError {
    fn code(&self) -> &'static str {
        match self {
            Self::Integrity(e) => e.code(),
            Self::Consensus(e) => e.code(),
            Self::Transient(e) => e.code(),
            Self::Policy(e) => e.code(),
            Self::NonCanonical => "PROCESSING_NON_CANONICAL",
            Self::DuplicateLeaf { .. } => "PROCESSING_DUPLICATE_LEAF",
            Self::Other(_) => "PROCESSING_OTHER",
        }
    }
}

/// Bundle-id already present on-chain; the orchestrator re-derives with an
/// incremented nonce up to 10 times before surfacing this.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollisionError {
    /// A bundle id collided on-chain more than the allowed retry budget.
    #[error("bundle id {bundle_id} collided {attempts} times, giving up")]
    BundleIdExhausted {
        /// The colliding bundle id, hex-encoded.
        bundle_id: String,
        /// Number of collision retries attempted.
        attempts: u32,
    },
}

impl ErrorCode for CollisionError {
    fn code(&self) -> &'static str {
        match self {
            Self::BundleIdExhausted { .. } => "COLLISION_BUNDLE_ID_EXHAUSTED",
        }
    }
}

/// Threshold not met, governance downgrade, or expired proof. Always
/// surfaced; never silently weakened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// BLS aggregate voting power did not meet the 2/3 threshold.
    #[error("attestation threshold not met: {signed}/{total}")]
    ThresholdNotMet {
        /// Signed voting power.
        signed: u128,
        /// Total voting power.
        total: u128,
    },
    /// Governance proof could not be generated and downgraded to a fallback.
    #[error("governance proof downgraded to fallback (unverified)")]
    GovernanceFallback,
    /// A proof or confirmation deadline elapsed before completion.
    #[error("operation expired: {0}")]
    Expired(String),
    /// An `on-demand` intent was missing required proof components.
    #[error("on-demand intent rejected: missing {0}")]
    MissingProofComponent(&'static str),
}

impl ErrorCode for PolicyError {
    fn code(&self) -> &'static str {
        match self {
            Self::ThresholdNotMet { .. } => "POLICY_THRESHOLD_NOT_MET",
            Self::GovernanceFallback => "POLICY_GOVERNANCE_FALLBACK",
            Self::Expired(_) => "POLICY_EXPIRED",
            Self::MissingProofComponent(_) => "POLICY_MISSING_PROOF_COMPONENT",
        }
    }
}
