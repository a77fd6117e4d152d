// Path: crates/types/src/batch.rs
//! Transaction records and batches awaiting anchoring.

use serde::{Deserialize, Serialize};

use crate::hash::Hash32;
use crate::intent::ProofClass;
use crate::proof::{ChainedProof, GovernanceLevel, GovernanceProofWrapper};

/// A single transaction queued for batch aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The Accumulate-style accumulator transaction hash.
    pub accum_tx_hash: Hash32,
    /// The source account URL.
    pub account_url: String,
    /// The 32-byte leaf hash contributed to the batch's merkle tree.
    pub tx_hash: Hash32,
    /// The classified intent type (e.g. `intent`, `cross-chain`).
    pub intent_type: String,
    /// The raw canonical intent data blob.
    pub intent_data: Vec<u8>,
    /// The chained proof backing this record, if produced.
    pub chained_proof: Option<ChainedProof>,
    /// The governance proof backing this record, if produced.
    pub gov_proof: Option<GovernanceProofWrapper>,
    /// The governance tier reached, if any.
    pub gov_level: Option<GovernanceLevel>,
}

/// The lifecycle state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Accepting new records.
    Open,
    /// Finalizing leaf order and root; no longer accepting records.
    Closing,
    /// Closed and handed to the anchor orchestrator.
    Closed,
}

/// A collection of transaction records accumulated for a single anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Stable identifier for this batch.
    pub batch_id: Hash32,
    /// Whether this batch follows the immediate or cadence-based flow.
    pub proof_class: ProofClass,
    /// The ordered transaction records, in arrival order.
    pub records: Vec<TransactionRecord>,
    /// The root of the binary merkle tree over `leaf_hashes`, once computed.
    pub merkle_root: Option<Hash32>,
    /// The ordered leaf hashes (mirrors `records[].tx_hash`).
    pub leaf_hashes: Vec<Hash32>,
    /// Running size for quick threshold checks.
    pub sizes: usize,
    /// Unix-epoch nanoseconds the batch was opened at.
    pub created_at: u128,
    /// Unix-epoch nanoseconds the batch was closed at, if closed.
    pub closed_at: Option<u128>,
    /// Current lifecycle state.
    pub status: BatchStatus,
}

impl Batch {
    /// Constructs a new, empty, open batch.
    pub fn new(batch_id: Hash32, proof_class: ProofClass, created_at: u128) -> Self {
        Self {
            batch_id,
            proof_class,
            records: Vec::new(),
            merkle_root: None,
            leaf_hashes: Vec::new(),
            sizes: 0,
            created_at,
            closed_at: None,
            status: BatchStatus::Open,
        }
    }

    /// True if `leaf` is already present among this batch's leaves.
    pub fn contains_leaf(&self, leaf: &Hash32) -> bool {
        self.leaf_hashes.contains(leaf)
    }
}

/// Computes the binary merkle root over ordered leaves, promoting odd
/// leaves unchanged at each level. Each leaf is first hashed with SHA-256
/// before pairwise combination.
pub fn merkle_root(leaves: &[Hash32]) -> Option<Hash32> {
    if leaves.is_empty() {
        return None;
    }
    let mut level: Vec<Hash32> = leaves.iter().map(|l| sha256(l.as_bytes())).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            if i + 1 < level.len() {
                next.push(sha256_pair(&level[i], &level[i + 1]));
            } else {
                next.push(level[i]);
            }
            i += 2;
        }
        level = next;
    }
    Some(level[0])
}

fn sha256(bytes: &[u8]) -> Hash32 {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Hash32(hasher.finalize().into())
}

fn sha256_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(a.as_bytes());
    hasher.update(b.as_bytes());
    Hash32(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(b: u8) -> Hash32 {
        Hash32([b; 32])
    }

    #[test]
    fn five_leaves_promote_last_unchanged() {
        let leaves = vec![h(1), h(2), h(3), h(4), h(5)];
        let root = merkle_root(&leaves).unwrap();

        let l1 = sha256(leaves[0].as_bytes());
        let l2 = sha256(leaves[1].as_bytes());
        let l3 = sha256(leaves[2].as_bytes());
        let l4 = sha256(leaves[3].as_bytes());
        let l5 = sha256(leaves[4].as_bytes());
        let n1 = sha256_pair(&l1, &l2);
        let n2 = sha256_pair(&l3, &l4);
        let n3 = sha256_pair(&n1, &n2);
        let expected = sha256_pair(&n3, &l5);

        assert_eq!(root, expected);
    }

    #[test]
    fn closing_twice_with_same_leaves_yields_same_root() {
        let leaves = vec![h(1), h(2), h(3)];
        assert_eq!(merkle_root(&leaves), merkle_root(&leaves));
    }

    #[test]
    fn empty_batch_has_no_root() {
        assert!(merkle_root(&[]).is_none());
    }
}
