// Path: crates/types/src/writeback.rs
//! The synthetic write-back transaction assembled for the source ledger.

use serde::{Deserialize, Serialize};

use crate::hash::Hash32;

/// A comprehensive, auditor-reconstructable record of one proof cycle.
/// Roughly 50 fields, grouped by concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveDataEntry {
    // --- intent references ---
    /// The originating intent id.
    pub intent_id: Hash32,
    /// The source-ledger transaction hash that carried the intent.
    pub source_transaction_hash: Hash32,
    /// The source account URL.
    pub account_url: String,
    /// The partition the intent was discovered on.
    pub partition: String,
    /// The organization ADI.
    pub organization_adi: String,

    // --- three-step target-chain call ---
    /// The `createAnchor` function selector.
    pub create_anchor_selector: [u8; 4],
    /// The target contract address for `createAnchor`.
    pub create_anchor_address: String,
    /// The `executeComprehensiveProof` function selector.
    pub execute_proof_selector: [u8; 4],
    /// The target contract address for `executeComprehensiveProof`.
    pub execute_proof_address: String,
    /// The final target contract address invoked.
    pub final_target_address: String,
    /// The value (wei) sent with the final call, if any.
    pub final_target_value: u128,

    // --- actual execution results ---
    /// The `createAnchor` transaction hash.
    pub create_anchor_tx_hash: Hash32,
    /// The `createAnchor` block number.
    pub create_anchor_block: u64,
    /// The `executeComprehensiveProof` transaction hash.
    pub execute_proof_tx_hash: Hash32,
    /// The `executeComprehensiveProof` block number.
    pub execute_proof_block: u64,
    /// Gas used by the `executeComprehensiveProof` call.
    pub gas_used: u64,

    // --- event/verification summary ---
    /// Hash over the concatenated event logs observed for this anchor.
    pub events_hash: Hash32,
    /// Whether `ProofVerificationFailed` was observed for this anchor.
    pub verification_failed: bool,

    // --- state roots ---
    /// The source-ledger state root at the time of write-back.
    pub state_root: Hash32,
    /// The receipts root covering this cycle's transactions.
    pub receipts_root: Hash32,
    /// The transactions root covering this cycle's transactions.
    pub transactions_root: Hash32,

    // --- governance ---
    /// Opaque reference to the governance proof backing this cycle.
    pub governance_proof_reference: Hash32,

    // --- commitments and anchor ---
    /// The bundle id this cycle anchored under.
    pub bundle_id: Hash32,
    /// The operation commitment.
    pub operation_commitment: Hash32,
    /// The cross-chain commitment.
    pub cross_chain_commitment: Hash32,
    /// The governance root commitment.
    pub governance_root: Hash32,

    // --- attestation ---
    /// The attested result hash.
    pub result_hash: Hash32,
    /// Number of validators whose signatures were aggregated.
    pub attestation_validator_count: u32,
    /// Whether the BLS attestation threshold was met.
    pub attestation_threshold_met: bool,

    // --- audit back-links ---
    /// The result hash of the previous cycle for this account, if any.
    pub previous_result_hash: Option<Hash32>,
    /// Monotonic sequence number for this account's write-back chain.
    pub sequence_number: u64,

    // --- confirmation ---
    /// Confirmation depth observed at write-back time.
    pub confirmations_at_writeback: u64,
    /// Whether the anchor had reached finality at write-back time.
    pub anchor_final: bool,
}

/// The synthetic transaction submitted to the source ledger closing a
/// proof cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticWriteBackTransaction {
    /// Locally assigned transaction id.
    pub tx_id: Hash32,
    /// `sha256("CERTEN_SYNTHETIC_TX_V1" || type || bundle_id || result_hash || principal || sha256(body))`.
    pub tx_hash: Hash32,
    /// The source-ledger principal this transaction is submitted under.
    pub principal: String,
    /// The transaction body.
    pub body: WriteBackBody,
    /// Ed25519 signatures over `tx_hash`.
    pub signatures: Vec<Vec<u8>>,
    /// Opaque reference to the attestation proof backing this transaction.
    pub attestation_proof: Hash32,
}

/// The body of a synthetic write-back transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteBackBody {
    /// A short summary of the overall proof cycle's result.
    pub proof_cycle_result: String,
    /// A short summary of the external-chain proof outcome.
    pub external_chain_proof_summary: String,
    /// The full comprehensive data entry.
    pub data_entry: ComprehensiveDataEntry,
}

impl SyntheticWriteBackTransaction {
    /// The literal type tag hashed into `tx_hash`.
    pub const TYPE_TAG: &'static str = "CERTEN_SYNTHETIC_TX_V1";

    /// Computes `tx_hash` from the transaction's canonical components.
    pub fn compute_tx_hash(
        tx_type: &str,
        bundle_id: &Hash32,
        result_hash: &Hash32,
        principal: &str,
        body_hash: &Hash32,
    ) -> Hash32 {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(Self::TYPE_TAG.as_bytes());
        hasher.update(tx_type.as_bytes());
        hasher.update(bundle_id.as_bytes());
        hasher.update(result_hash.as_bytes());
        hasher.update(principal.as_bytes());
        hasher.update(body_hash.as_bytes());
        Hash32(hasher.finalize().into())
    }
}

/// The status of a submitted synthetic transaction, per the write-back
/// watcher's polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteBackStatus {
    /// Submitted, not yet included.
    Pending,
    /// Included and accepted by the source ledger.
    Confirmed,
    /// Included but execution failed.
    Failed,
    /// Rejected before execution (e.g. bad signature, bad principal).
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_hash_is_deterministic_given_same_inputs() {
        let bundle_id = Hash32([1u8; 32]);
        let result_hash = Hash32([2u8; 32]);
        let body_hash = Hash32([3u8; 32]);
        let a = SyntheticWriteBackTransaction::compute_tx_hash(
            "write_back",
            &bundle_id,
            &result_hash,
            "acc://foo.acme",
            &body_hash,
        );
        let b = SyntheticWriteBackTransaction::compute_tx_hash(
            "write_back",
            &bundle_id,
            &result_hash,
            "acc://foo.acme",
            &body_hash,
        );
        assert_eq!(a, b);
    }
}
