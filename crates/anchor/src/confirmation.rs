// Path: crates/anchor/src/confirmation.rs
//! Tracks confirmation depth for unfinalized anchors, polling the target
//! chain's head and cascading `final` updates through the confirmation
//! repository.

use std::sync::Arc;

use certen_clients::target_chain::TargetChainClient;
use certen_types::confirmation::ConfirmationRecord;
use certen_types::repository::{AttestationRepository, ConfirmationRepository, ProofRepository};
use certen_types::Result;

/// Default polling interval, in seconds, for the confirmation tracker.
pub const CONFIRMATION_POLL_INTERVAL_SECS: u64 = 30;

/// Polls the target chain head and updates every unfinalized
/// confirmation record accordingly, cascading finality to any proof and
/// attestation bundle linked to the same anchor id.
pub struct ConfirmationTracker<C: TargetChainClient + ?Sized> {
    target: Arc<C>,
    repository: Arc<dyn ConfirmationRepository>,
    proofs: Arc<dyn ProofRepository>,
    attestations: Arc<dyn AttestationRepository>,
    required_confirmations: u64,
}

impl<C: TargetChainClient + ?Sized> ConfirmationTracker<C> {
    /// Builds a tracker requiring `required_confirmations` confirmations
    /// for finality.
    pub fn new(
        target: Arc<C>,
        repository: Arc<dyn ConfirmationRepository>,
        proofs: Arc<dyn ProofRepository>,
        attestations: Arc<dyn AttestationRepository>,
        required_confirmations: u64,
    ) -> Self {
        Self { target, repository, proofs, attestations, required_confirmations }
    }

    /// Runs one polling tick: fetches the current head, updates every
    /// unfinalized record's confirmation depth, and persists those that
    /// changed (including ones that just became final). A record that
    /// transitions to final cascades finality to its linked proof and
    /// attestation bundle, if either has been stored.
    pub async fn tick(&self) -> Result<usize> {
        let latest = self
            .target
            .block_number()
            .await
            .map_err(certen_types::error::ProcessingError::Transient)?;

        let unfinalized = self.repository.list_unfinalized().await?;
        let mut updated = 0;
        for mut record in unfinalized {
            let was_final = record.r#final;
            record.update(latest, self.required_confirmations);
            self.repository.put(&record).await?;
            if record.r#final && !was_final {
                self.proofs.mark_final(&record.anchor_id).await?;
                self.attestations.mark_final(&record.anchor_id).await?;
            }
            updated += 1;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certen_clients::target_chain::{ContractEvent, TxSubmissionReceipt};
    use certen_types::anchor::CertenProof;
    use certen_types::attestation::{Aggregated, AttestationBundle};
    use certen_types::error::TransientError;
    use certen_types::hash::Hash32;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};

    struct FakeTarget {
        head: u64,
    }

    #[async_trait]
    impl TargetChainClient for FakeTarget {
        async fn block_number(&self) -> std::result::Result<u64, TransientError> {
            Ok(self.head)
        }
        async fn filter_logs(&self, _from_block: u64, _to_block: u64) -> std::result::Result<Vec<ContractEvent>, TransientError> {
            Ok(vec![])
        }
        async fn call_contract(&self, _calldata: &[u8]) -> std::result::Result<Vec<u8>, TransientError> {
            Ok(vec![])
        }
        async fn send_transaction_with_retry(&self, _calldata: &[u8]) -> std::result::Result<TxSubmissionReceipt, TransientError> {
            Ok(TxSubmissionReceipt {
                tx_hash: Hash32::ZERO,
                block_number: 1,
                block_hash: Hash32::ZERO,
                gas_used: 21000,
                gas_cost: 21000,
            })
        }
    }

    #[derive(Default)]
    struct MemConfirmations {
        records: Mutex<Vec<ConfirmationRecord>>,
    }

    #[async_trait]
    impl ConfirmationRepository for MemConfirmations {
        async fn put(&self, record: &ConfirmationRecord) -> Result<()> {
            let mut records = self.records.lock();
            if let Some(existing) = records.iter_mut().find(|r| r.anchor_id == record.anchor_id) {
                *existing = record.clone();
            } else {
                records.push(record.clone());
            }
            Ok(())
        }
        async fn get(&self, anchor_id: &Hash32) -> Result<Option<ConfirmationRecord>> {
            Ok(self.records.lock().iter().find(|r| &r.anchor_id == anchor_id).cloned())
        }
        async fn list_unfinalized(&self) -> Result<Vec<ConfirmationRecord>> {
            Ok(self.records.lock().iter().filter(|r| !r.r#final).cloned().collect())
        }
    }

    #[derive(Default)]
    struct MemProofs {
        proofs: Mutex<HashMap<Hash32, CertenProof>>,
        finalized: Mutex<HashSet<Hash32>>,
    }

    #[async_trait]
    impl ProofRepository for MemProofs {
        async fn put(&self, anchor_id: &Hash32, proof: &CertenProof) -> Result<()> {
            self.proofs.lock().insert(*anchor_id, proof.clone());
            Ok(())
        }
        async fn get(&self, anchor_id: &Hash32) -> Result<Option<CertenProof>> {
            Ok(self.proofs.lock().get(anchor_id).cloned())
        }
        async fn mark_final(&self, anchor_id: &Hash32) -> Result<()> {
            if self.proofs.lock().contains_key(anchor_id) {
                self.finalized.lock().insert(*anchor_id);
            }
            Ok(())
        }
        async fn is_final(&self, anchor_id: &Hash32) -> Result<bool> {
            Ok(self.finalized.lock().contains(anchor_id))
        }
    }

    #[derive(Default)]
    struct MemAttestations {
        bundles: Mutex<HashMap<Hash32, AttestationBundle>>,
        finalized: Mutex<HashSet<Hash32>>,
    }

    #[async_trait]
    impl AttestationRepository for MemAttestations {
        async fn put(&self, bundle: &AttestationBundle) -> Result<()> {
            self.bundles.lock().insert(bundle.bundle_id, bundle.clone());
            Ok(())
        }
        async fn get(&self, bundle_id: &Hash32) -> Result<Option<AttestationBundle>> {
            Ok(self.bundles.lock().get(bundle_id).cloned())
        }
        async fn mark_final(&self, bundle_id: &Hash32) -> Result<()> {
            if self.bundles.lock().contains_key(bundle_id) {
                self.finalized.lock().insert(*bundle_id);
            }
            Ok(())
        }
        async fn is_final(&self, bundle_id: &Hash32) -> Result<bool> {
            Ok(self.finalized.lock().contains(bundle_id))
        }
    }

    fn sample_proof() -> CertenProof {
        CertenProof {
            transaction_hash: Hash32::ZERO,
            merkle_root: Hash32::ZERO,
            proof_hashes: vec![],
            leaf_hash: Hash32::ZERO,
            governance_proof: vec![],
            bls_proof: vec![],
            commitments: (Hash32::ZERO, Hash32::ZERO, Hash32::ZERO),
            expiration_time: 0,
            metadata: vec![],
        }
    }

    fn sample_bundle(bundle_id: Hash32) -> AttestationBundle {
        AttestationBundle {
            bundle_id,
            result_hash: Hash32::ZERO,
            aggregated: Aggregated {
                validator_count: 3,
                signed_voting_power: 3,
                total_voting_power: 3,
                threshold_met: true,
                aggregate_signature: vec![],
            },
        }
    }

    #[tokio::test]
    async fn tick_finalizes_once_depth_reached() {
        let repo = Arc::new(MemConfirmations::default());
        repo.put(&ConfirmationRecord {
            anchor_id: Hash32::ZERO,
            block_number: 100,
            confirmations: 0,
            r#final: false,
            block_hash: Hash32::ZERO,
        })
        .await
        .unwrap();

        let tracker = ConfirmationTracker::new(
            Arc::new(FakeTarget { head: 111 }),
            repo.clone(),
            Arc::new(MemProofs::default()),
            Arc::new(MemAttestations::default()),
            12,
        );
        tracker.tick().await.unwrap();

        let record = repo.get(&Hash32::ZERO).await.unwrap().unwrap();
        assert!(record.r#final);
    }

    #[tokio::test]
    async fn tick_cascades_finality_to_linked_proof_and_attestation() {
        let repo = Arc::new(MemConfirmations::default());
        repo.put(&ConfirmationRecord {
            anchor_id: Hash32::ZERO,
            block_number: 100,
            confirmations: 0,
            r#final: false,
            block_hash: Hash32::ZERO,
        })
        .await
        .unwrap();

        let proofs = Arc::new(MemProofs::default());
        proofs.put(&Hash32::ZERO, &sample_proof()).await.unwrap();
        let attestations = Arc::new(MemAttestations::default());
        attestations.put(&sample_bundle(Hash32::ZERO)).await.unwrap();

        let tracker = ConfirmationTracker::new(
            Arc::new(FakeTarget { head: 111 }),
            repo.clone(),
            proofs.clone(),
            attestations.clone(),
            12,
        );
        tracker.tick().await.unwrap();

        assert!(proofs.is_final(&Hash32::ZERO).await.unwrap());
        assert!(attestations.is_final(&Hash32::ZERO).await.unwrap());
    }
}
