// Path: crates/types/src/anchor.rs
//! The on-chain anchor entity and its wire invariants.

use serde::{Deserialize, Serialize};

use crate::hash::Hash32;

/// The on-chain anchor record, as stored by the anchor contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anchor {
    /// Collision-prevented identifier derived from `batch_id` and a
    /// nanosecond nonce.
    pub bundle_id: Hash32,
    /// The operation commitment.
    pub operation_commitment: Hash32,
    /// The cross-chain commitment.
    pub cross_chain_commitment: Hash32,
    /// The governance root commitment.
    pub governance_root: Hash32,
    /// The source ledger's accumulate block height this anchor covers.
    pub accumulate_block_height: u64,
    /// Unix timestamp the anchor was submitted at.
    pub timestamp: u64,
    /// The validator address that submitted this anchor.
    pub validator_address: String,
    /// Whether the contract considers this anchor valid.
    pub valid: bool,
    /// The source-ledger batch this anchor covers.
    pub batch_id: Hash32,
    /// Transaction hash of the `createAnchor` call.
    pub create_anchor_tx_hash: Hash32,
    /// Block the `createAnchor` transaction was mined in.
    pub create_anchor_block: u64,
    /// Transaction hash of the `executeComprehensiveProof` call.
    pub execute_proof_tx_hash: Hash32,
    /// Block the `executeComprehensiveProof` transaction was mined in.
    pub execute_proof_block: u64,
    /// Combined gas used by both transactions.
    pub gas_used: u64,
    /// Combined gas cost, in wei, of both transactions.
    pub gas_cost: u128,
}

impl Anchor {
    /// Computes `keccak256(op || cc || gov)`, the value the contract's
    /// `merkle_root` field must equal.
    pub fn expected_merkle_root(
        op: &Hash32,
        cc: &Hash32,
        gov: &Hash32,
    ) -> Hash32 {
        use sha3::{Digest, Keccak256};
        let mut hasher = Keccak256::new();
        hasher.update(op.as_bytes());
        hasher.update(cc.as_bytes());
        hasher.update(gov.as_bytes());
        Hash32(hasher.finalize().into())
    }
}

/// The proof tuple submitted in `executeComprehensiveProof`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertenProof {
    /// The source-ledger transaction hash this proof covers.
    pub transaction_hash: Hash32,
    /// Must equal `Anchor::expected_merkle_root(op, cc, gov)`.
    pub merkle_root: Hash32,
    /// The merkle inclusion path hashes.
    pub proof_hashes: Vec<Hash32>,
    /// The leaf hash this path proves inclusion of.
    pub leaf_hash: Hash32,
    /// Opaque governance proof bytes.
    pub governance_proof: Vec<u8>,
    /// Opaque BLS proof bytes.
    pub bls_proof: Vec<u8>,
    /// The three commitments, in `(op, cc, gov)` order.
    pub commitments: (Hash32, Hash32, Hash32),
    /// Unix timestamp after which this proof is no longer valid.
    pub expiration_time: u64,
    /// Free-form metadata bytes.
    pub metadata: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_root_is_deterministic() {
        let op = Hash32([1u8; 32]);
        let cc = Hash32([2u8; 32]);
        let gov = Hash32([3u8; 32]);
        let a = Anchor::expected_merkle_root(&op, &cc, &gov);
        let b = Anchor::expected_merkle_root(&op, &cc, &gov);
        assert_eq!(a, b);
    }
}
