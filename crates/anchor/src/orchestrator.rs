// Path: crates/anchor/src/orchestrator.rs
//! Submits a closed batch's merkle root and comprehensive proof to the
//! target chain's anchor contract in two steps, retrying bundle-id
//! collisions with an incremented nonce.

use sha2::{Digest, Sha256};

use certen_clients::target_chain::{TargetChainClient, TxSubmissionReceipt};
use certen_types::anchor::{Anchor, CertenProof};
use certen_types::error::{CollisionError, ProcessingError};
use certen_types::hash::Hash32;

/// Maximum number of times a colliding bundle id is re-derived before
/// giving up.
pub const MAX_BUNDLE_ID_RETRIES: u32 = 10;

/// Derives a bundle id from `batch_id` and a nonce, so a collision can be
/// retried by incrementing `nonce` without touching the batch itself.
pub fn derive_bundle_id(batch_id: Hash32, nonce: u64) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(batch_id.as_bytes());
    hasher.update(nonce.to_be_bytes());
    Hash32(hasher.finalize().into())
}

/// Orchestrates anchor submission against a target chain client.
pub struct AnchorOrchestrator<C: TargetChainClient + ?Sized> {
    target: std::sync::Arc<C>,
    validator_address: String,
}

impl<C: TargetChainClient + ?Sized> AnchorOrchestrator<C> {
    /// Builds an orchestrator submitting as `validator_address`.
    pub fn new(target: std::sync::Arc<C>, validator_address: impl Into<String>) -> Self {
        Self { target, validator_address: validator_address.into() }
    }

    /// Finds a bundle id with no on-chain collision, checking with
    /// `exists_and_valid`, retrying up to [`MAX_BUNDLE_ID_RETRIES`] times.
    pub async fn resolve_bundle_id<F, Fut>(
        &self,
        batch_id: Hash32,
        exists_and_valid: F,
    ) -> Result<Hash32, CollisionError>
    where
        F: Fn(Hash32) -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for attempt in 0..MAX_BUNDLE_ID_RETRIES {
            let candidate = derive_bundle_id(batch_id, attempt as u64);
            if !exists_and_valid(candidate).await {
                return Ok(candidate);
            }
        }
        Err(CollisionError::BundleIdExhausted {
            bundle_id: derive_bundle_id(batch_id, 0).to_hex(),
            attempts: MAX_BUNDLE_ID_RETRIES,
        })
    }

    /// Submits `createAnchor(bundle_id, anchor)` as ABI-encoded calldata.
    /// Encoding is a placeholder selector + canonical field concatenation;
    /// the production contract ABI is out of scope here.
    pub async fn create_anchor(&self, anchor: &Anchor) -> Result<TxSubmissionReceipt, ProcessingError> {
        let calldata = encode_create_anchor(anchor);
        self.target
            .send_transaction_with_retry(&calldata)
            .await
            .map_err(ProcessingError::Transient)
    }

    /// Submits `executeComprehensiveProof(proof)`, first verifying the
    /// proof's `merkle_root` matches the expected commitment derivation.
    pub async fn execute_comprehensive_proof(&self, proof: &CertenProof) -> Result<TxSubmissionReceipt, ProcessingError> {
        let (op, cc, gov) = proof.commitments;
        let expected = Anchor::expected_merkle_root(&op, &cc, &gov);
        if expected != proof.merkle_root {
            return Err(ProcessingError::Integrity(
                certen_types::error::IntegrityError::RootMismatch {
                    expected: expected.to_hex(),
                    stored: proof.merkle_root.to_hex(),
                },
            ));
        }
        let calldata = encode_execute_proof(proof);
        self.target
            .send_transaction_with_retry(&calldata)
            .await
            .map_err(ProcessingError::Transient)
    }

    /// Returns the validator address this orchestrator submits as.
    pub fn validator_address(&self) -> &str {
        &self.validator_address
    }
}

fn encode_create_anchor(anchor: &Anchor) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"createAnchor:");
    out.extend_from_slice(anchor.bundle_id.as_bytes());
    out.extend_from_slice(anchor.operation_commitment.as_bytes());
    out.extend_from_slice(anchor.cross_chain_commitment.as_bytes());
    out.extend_from_slice(anchor.governance_root.as_bytes());
    out
}

fn encode_execute_proof(proof: &CertenProof) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"executeComprehensiveProof:");
    out.extend_from_slice(proof.transaction_hash.as_bytes());
    out.extend_from_slice(proof.merkle_root.as_bytes());
    out.extend_from_slice(proof.leaf_hash.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certen_clients::target_chain::ContractEvent;
    use certen_types::error::TransientError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FakeTarget {
        accepted: AtomicBool,
    }

    #[async_trait]
    impl TargetChainClient for FakeTarget {
        async fn block_number(&self) -> Result<u64, TransientError> {
            Ok(1)
        }
        async fn filter_logs(&self, _from_block: u64, _to_block: u64) -> Result<Vec<ContractEvent>, TransientError> {
            Ok(vec![])
        }
        async fn call_contract(&self, _calldata: &[u8]) -> Result<Vec<u8>, TransientError> {
            Ok(vec![])
        }
        async fn send_transaction_with_retry(&self, _calldata: &[u8]) -> Result<TxSubmissionReceipt, TransientError> {
            self.accepted.store(true, Ordering::SeqCst);
            Ok(TxSubmissionReceipt {
                tx_hash: Hash32::ZERO,
                block_number: 1,
                block_hash: Hash32::ZERO,
                gas_used: 21000,
                gas_cost: 21000,
            })
        }
    }

    #[test]
    fn bundle_id_changes_with_nonce() {
        let batch_id = Hash32([1u8; 32]);
        assert_ne!(derive_bundle_id(batch_id, 0), derive_bundle_id(batch_id, 1));
    }

    #[tokio::test]
    async fn resolve_bundle_id_retries_on_collision_then_succeeds() {
        let batch_id = Hash32([1u8; 32]);
        let orchestrator = AnchorOrchestrator::new(Arc::new(FakeTarget { accepted: AtomicBool::new(false) }), "validator-1");
        let first_candidate = derive_bundle_id(batch_id, 0);
        let result = orchestrator
            .resolve_bundle_id(batch_id, |candidate| {
                let collides = candidate == first_candidate;
                async move { collides }
            })
            .await;
        assert_eq!(result.unwrap(), derive_bundle_id(batch_id, 1));
    }

    #[tokio::test]
    async fn resolve_bundle_id_exhausts_after_max_retries() {
        let batch_id = Hash32([1u8; 32]);
        let orchestrator = AnchorOrchestrator::new(Arc::new(FakeTarget { accepted: AtomicBool::new(false) }), "validator-1");
        let result = orchestrator.resolve_bundle_id(batch_id, |_| async { true }).await;
        assert!(matches!(result, Err(CollisionError::BundleIdExhausted { .. })));
    }

    #[tokio::test]
    async fn execute_proof_rejects_mismatched_root() {
        let target = Arc::new(FakeTarget { accepted: AtomicBool::new(false) });
        let orchestrator = AnchorOrchestrator::new(target, "validator-1");
        let proof = CertenProof {
            transaction_hash: Hash32::ZERO,
            merkle_root: Hash32([9u8; 32]),
            proof_hashes: vec![],
            leaf_hash: Hash32::ZERO,
            governance_proof: vec![],
            bls_proof: vec![],
            commitments: (Hash32([1u8; 32]), Hash32([2u8; 32]), Hash32([3u8; 32])),
            expiration_time: 0,
            metadata: vec![],
        };
        assert!(orchestrator.execute_comprehensive_proof(&proof).await.is_err());
    }
}
