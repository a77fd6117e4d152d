// Path: crates/storage/src/proof.rs
//! In-memory comprehensive proof store.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use certen_types::anchor::CertenProof;
use certen_types::hash::Hash32;
use certen_types::repository::ProofRepository;
use certen_types::Result;

/// Stores proofs keyed by `anchor_id`, with a separate final-state set so
/// `mark_final` can cascade from the confirmation tracker without needing
/// to re-clone and rewrite the stored proof.
#[derive(Default)]
pub struct InMemoryProofRepository {
    proofs: Mutex<HashMap<Hash32, CertenProof>>,
    finalized: Mutex<HashSet<Hash32>>,
}

#[async_trait::async_trait]
impl ProofRepository for InMemoryProofRepository {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CertenProof {
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

    #[tokio::test]
    async fn mark_final_is_noop_without_a_stored_proof() {
        let repo = InMemoryProofRepository::default();
        repo.mark_final(&Hash32([1u8; 32])).await.unwrap();
        assert!(!repo.is_final(&Hash32([1u8; 32])).await.unwrap());
    }

    #[tokio::test]
    async fn mark_final_flips_flag_for_stored_proof() {
        let repo = InMemoryProofRepository::default();
        let anchor_id = Hash32([1u8; 32]);
        repo.put(&anchor_id, &sample()).await.unwrap();
        assert!(!repo.is_final(&anchor_id).await.unwrap());
        repo.mark_final(&anchor_id).await.unwrap();
        assert!(repo.is_final(&anchor_id).await.unwrap());
    }
}
