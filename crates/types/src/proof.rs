// Path: crates/types/src/proof.rs
//! Chained (L1/L2/L3) and governance (G0/G1/G2) proof entities.

use serde::{Deserialize, Serialize};

use crate::hash::Hash32;
use crate::receipt::Receipt;

/// Entry inclusion into a partition anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer1 {
    /// The account/chain scope this entry belongs to.
    pub scope: String,
    /// The partition chain name.
    pub chain_name: String,
    /// The entry's index within the chain.
    pub chain_index: u64,
    /// The leaf value, must equal `receipt.start`.
    pub leaf: Hash32,
    /// The partition anchor, must equal `receipt.anchor`.
    pub anchor: Hash32,
    /// The merkle receipt proving `leaf` folds to `anchor`.
    pub receipt: Receipt,
    /// The partition this entry was queried from. Must be non-empty.
    pub source_partition: String,
    /// Local block height, must equal `receipt.local_block`.
    pub local_block: u64,
}

impl Layer1 {
    /// Checks the structural invariants: `leaf == receipt.start`,
    /// `anchor == receipt.anchor`, `local_block == receipt.local_block`,
    /// and a non-empty `source_partition`.
    pub fn validate(&self) -> bool {
        self.leaf == self.receipt.start
            && self.anchor == self.receipt.anchor
            && self.local_block == self.receipt.local_block
            && !self.source_partition.is_empty()
            && self.receipt.validate()
    }
}

/// Partition anchor inclusion into the directory network root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer2 {
    /// Must equal `L1.anchor`.
    pub start: Hash32,
    /// The DN root.
    pub anchor: Hash32,
    /// The merkle receipt proving `start` folds to `anchor`.
    pub receipt: Receipt,
    /// The DN minor block height.
    pub local_block: u64,
    /// Always `acc://dn.acme/anchors` for this scope.
    pub scope: String,
}

impl Layer2 {
    /// The canonical DN anchors scope.
    pub const SCOPE: &'static str = "acc://dn.acme/anchors";

    /// Checks structural validity and the stitching invariant against `l1`.
    pub fn validate(&self, l1: &Layer1) -> bool {
        self.start == l1.anchor
            && self.start == self.receipt.start
            && self.anchor == self.receipt.anchor
            && self.receipt.validate()
    }
}

/// Validator set and signatures backing a consensus commit at a height.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusFinality {
    /// The partition the finality binding covers.
    pub partition: String,
    /// The network identifier.
    pub network: String,
    /// The consensus height queried, must equal `L2.local_block + 1`.
    pub height: u64,
    /// The app hash / root returned by the consensus client.
    pub root: Hash32,
    /// Validator identifiers that participated.
    pub validators: Vec<String>,
    /// Whether aggregated voting power met the 2/3 threshold.
    pub power_ok: bool,
    /// Whether `root` equals the layer's anchor.
    pub root_binding_ok: bool,
}

impl ConsensusFinality {
    /// True when both power and root-binding checks passed.
    pub fn is_fully_verified(&self) -> bool {
        self.power_ok && self.root_binding_ok
    }
}

/// Derived trust tag describing how deeply a chained proof is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustLevel {
    /// L3 present with both power and root-binding checks true.
    ConsensusVerified,
    /// Only L1+L2 present and valid.
    DnAnchored,
    /// Only partition-level proof available.
    PartitionTrust,
    /// None of the above hold.
    NoTrust,
}

/// The proof-grade mode the chained proof builder operates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProofMode {
    /// Requires L3 consensus binding; fails closed if unavailable or invalid.
    ProofGrade,
    /// Skips L3, producing a partial (L1+L2 only) proof.
    AnchoredOnly,
}

/// A full chained proof: L1, L2, and an optional L3 consensus binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainedProof {
    /// Entry inclusion into the partition anchor.
    pub l1: Layer1,
    /// Partition anchor inclusion into the DN root.
    pub l2: Layer2,
    /// Optional consensus finality binding.
    pub l3: Option<ConsensusFinality>,
    /// The derived trust level.
    pub trust_level: TrustLevel,
}

impl ChainedProof {
    /// Derives the trust level from the presence/validity of L1, L2, and L3,
    /// per the tiering rules: consensus-verified > DN-anchored > partition
    /// trust > no trust.
    pub fn derive_trust_level(l1_valid: bool, l2_valid: bool, l3: Option<&ConsensusFinality>) -> TrustLevel {
        if l1_valid && l2_valid {
            if let Some(finality) = l3 {
                if finality.is_fully_verified() {
                    return TrustLevel::ConsensusVerified;
                }
            }
            return TrustLevel::DnAnchored;
        }
        if l1_valid {
            return TrustLevel::PartitionTrust;
        }
        TrustLevel::NoTrust
    }
}

/// The governance proof's tier: inclusion/finality, +authority, +outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GovernanceLevel {
    /// Inclusion and finality of the transaction plus the key-book root.
    G0,
    /// G0 plus key-page authority validation and signature threshold.
    G1,
    /// G1 plus a canonical outcome-payload binding.
    G2,
}

/// G0: inclusion/finality over the transaction chain plus the key-book root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct G0Proof {
    /// The transaction hash this proof covers.
    pub tx_hash: Hash32,
    /// The account scope the transaction was found on.
    pub scope: String,
    /// The partition chain the transaction's receipt was drawn from.
    pub chain: String,
    /// The principal (account) the key-book belongs to.
    pub principal: String,
    /// True once the inclusion/finality receipt has been verified.
    pub g0_complete: bool,
}

/// G1: G0 plus authority validation over the key-page hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct G1Proof {
    /// The underlying G0 proof.
    pub g0: G0Proof,
    /// Merkle path from the signing key-page to the key-book root.
    pub key_page_path: Receipt,
    /// The derived authority address.
    pub authority_address: String,
    /// Number of signatures actually provided.
    pub provided_signatures: u32,
    /// Number of signatures required by the key-page's threshold.
    pub required_signatures: u32,
}

impl G1Proof {
    /// True when the provided signature count meets the key-page's threshold.
    pub fn threshold_met(&self) -> bool {
        self.provided_signatures >= self.required_signatures
    }
}

/// G2: G1 plus a canonical hash binding the outcome payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct G2Proof {
    /// The underlying G1 proof.
    pub g1: G1Proof,
    /// Canonical hash of the execution outcome payload.
    pub outcome_binding: Hash32,
}

/// The governance proof wrapper returned to callers, tagged by tier and
/// carrying the opaque raw proof reference plus the sole downstream policy
/// flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceProofWrapper {
    /// The highest tier reached.
    pub level: GovernanceLevel,
    /// Opaque bytes for the underlying proof, as produced by the generator
    /// or delegated out-of-process helper.
    pub raw_proof: Vec<u8>,
    /// The sole policy flag downstream consumers act on.
    pub verified: bool,
}

impl GovernanceProofWrapper {
    /// Builds the stub fallback wrapper emitted when no delegation is
    /// configured: `verified=false`, classified downstream as `G_fallback`.
    pub fn fallback() -> Self {
        Self {
            level: GovernanceLevel::G0,
            raw_proof: Vec::new(),
            verified: false,
        }
    }
}
