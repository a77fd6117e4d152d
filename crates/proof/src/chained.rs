// Path: crates/proof/src/chained.rs
//! Builds a [`ChainedProof`] for a discovered transaction: L1 inclusion
//! into its partition anchor, L2 inclusion of that anchor into the
//! directory-network root, and an optional L3 consensus-finality binding.

use std::sync::Arc;

use certen_clients::consensus::ConsensusClient;
use certen_clients::source_ledger::SourceLedgerClient;
use certen_types::error::{IntegrityError, ProcessingError};
use certen_types::hash::Hash32;
use certen_types::proof::{ChainedProof, ConsensusFinality, Layer1, Layer2, ProofMode};

/// Builds chained proofs against a source ledger client and a consensus
/// client. `mode` controls whether a missing or invalid L3 binding fails
/// the whole build (`ProofGrade`) or is tolerated (`AnchoredOnly`).
pub struct ChainedProofBuilder {
    source: Arc<dyn SourceLedgerClient>,
    consensus: Arc<dyn ConsensusClient>,
    network: String,
    mode: ProofMode,
}

impl ChainedProofBuilder {
    /// Builds a new proof builder bound to `network`'s consensus identity.
    pub fn new(
        source: Arc<dyn SourceLedgerClient>,
        consensus: Arc<dyn ConsensusClient>,
        network: impl Into<String>,
        mode: ProofMode,
    ) -> Self {
        Self {
            source,
            consensus,
            network: network.into(),
            mode,
        }
    }

    /// Builds L1: fetches the account's inclusion receipt into its
    /// partition anchor and wraps it with the structural fields the
    /// invariant checks need.
    pub async fn build_l1(
        &self,
        account_url: &str,
        tx_hash: Hash32,
        chain_name: &str,
        chain_index: u64,
        source_partition: &str,
    ) -> Result<Layer1, ProcessingError> {
        let (_intent, receipt) = self
            .source
            .query_account_with_receipt(account_url, tx_hash)
            .await?;
        let l1 = Layer1 {
            scope: account_url.to_string(),
            chain_name: chain_name.to_string(),
            chain_index,
            leaf: receipt.start,
            anchor: receipt.anchor,
            local_block: receipt.local_block,
            receipt,
            source_partition: source_partition.to_string(),
        };
        if !l1.validate() {
            return Err(ProcessingError::Integrity(IntegrityError::InvariantViolated(
                "L1 structural invariant failed".to_string(),
            )));
        }
        Ok(l1)
    }

    /// Builds L2: fetches the directory-network chain entry proving the
    /// partition anchor (`l1.anchor`) folds into the DN root.
    pub async fn build_l2(&self, l1: &Layer1) -> Result<Layer2, ProcessingError> {
        let (_entry, receipt) = self
            .source
            .query_chain_entry(Layer2::SCOPE, l1.local_block)
            .await?;
        let l2 = Layer2 {
            start: receipt.start,
            anchor: receipt.anchor,
            local_block: l1.local_block,
            receipt,
            scope: Layer2::SCOPE.to_string(),
        };
        if !l2.validate(l1) {
            return Err(ProcessingError::Integrity(IntegrityError::StitchMismatch {
                l1_anchor: l1.anchor.to_hex(),
                l2_start: l2.start.to_hex(),
            }));
        }
        Ok(l2)
    }

    /// Builds L3: fetches the consensus commit and app hash at
    /// `l2.local_block + 1` and checks the power/root-binding thresholds.
    pub async fn build_l3(&self, partition: &str, l2: &Layer2) -> Result<ConsensusFinality, ProcessingError> {
        let height = l2.local_block + 1;
        let commit = self.consensus.get_commit(height).await?;
        let root = self.consensus.get_block_app_hash(height).await?;
        let power_ok = 3 * commit.signed_power >= 2 * commit.total_power;
        let root_binding_ok = commit.root_binding_ok && root == l2.anchor;
        Ok(ConsensusFinality {
            partition: partition.to_string(),
            network: self.network.clone(),
            height,
            root,
            validators: Vec::new(),
            power_ok,
            root_binding_ok,
        })
    }

    /// Builds the full chained proof, stitching L1 through L3 and deriving
    /// the trust level. In `ProofGrade` mode an L3 fetch failure is fatal;
    /// in `AnchoredOnly` mode it degrades to an L1+L2 proof.
    pub async fn build(
        &self,
        account_url: &str,
        tx_hash: Hash32,
        chain_name: &str,
        chain_index: u64,
        source_partition: &str,
    ) -> Result<ChainedProof, ProcessingError> {
        let l1 = self
            .build_l1(account_url, tx_hash, chain_name, chain_index, source_partition)
            .await?;
        let l2 = self.build_l2(&l1).await?;

        let l3 = match self.build_l3(source_partition, &l2).await {
            Ok(finality) => Some(finality),
            Err(e) if self.mode == ProofMode::ProofGrade => return Err(e),
            Err(e) => {
                tracing::debug!(target = "certen_proof", error = %e, "L3 unavailable, degrading to anchored-only");
                None
            }
        };

        let trust_level = ChainedProof::derive_trust_level(l1.validate(), l2.validate(&l1), l3.as_ref());
        Ok(ChainedProof { l1, l2, l3, trust_level })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certen_clients::consensus::Commit;
    use certen_clients::source_ledger::TaggedTransaction;
    use certen_types::error::TransientError;
    use certen_types::intent::Intent;
    use certen_types::receipt::Receipt;
    use certen_types::status::IntentStatus;

    struct FakeSource {
        receipt: Receipt,
        anchor_receipt: Receipt,
    }

    #[async_trait]
    impl SourceLedgerClient for FakeSource {
        async fn get_latest_block(&self) -> Result<u64, TransientError> {
            Ok(0)
        }
        async fn search_tagged_transactions(
            &self,
            _from_height: u64,
            _to_height: u64,
        ) -> Result<Vec<TaggedTransaction>, TransientError> {
            Ok(vec![])
        }
        async fn query_account_with_receipt(
            &self,
            _account_url: &str,
            _tx_hash: Hash32,
        ) -> Result<(Intent, Receipt), TransientError> {
            Ok((
                Intent {
                    intent_id: None,
                    transaction_hash: Hash32::ZERO,
                    account_url: "acc://a".into(),
                    partition: "bvn1".into(),
                    organization_adi: "acc://org".into(),
                    intent_data: vec![],
                    cross_chain_data: vec![],
                    governance_data: vec![],
                    replay_data: vec![],
                },
                self.receipt.clone(),
            ))
        }
        async fn query_chain_entry(
            &self,
            _chain_name: &str,
            _height: u64,
        ) -> Result<(Hash32, Receipt), TransientError> {
            Ok((self.anchor_receipt.start, self.anchor_receipt.clone()))
        }
        async fn submit_synthetic_transaction(&self, _signed_body: &[u8]) -> Result<Hash32, TransientError> {
            Ok(Hash32::ZERO)
        }
        async fn get_transaction_status(&self, _tx_hash: Hash32) -> Result<IntentStatus, TransientError> {
            Ok(IntentStatus::Completed)
        }
    }

    struct FakeConsensus {
        commit: Commit,
        app_hash: Hash32,
    }

    #[async_trait]
    impl ConsensusClient for FakeConsensus {
        async fn get_commit(&self, _height: u64) -> Result<Commit, TransientError> {
            Ok(self.commit.clone())
        }
        async fn get_block_app_hash(&self, _height: u64) -> Result<Hash32, TransientError> {
            Ok(self.app_hash)
        }
    }

    fn single_leaf_receipt(leaf: Hash32) -> Receipt {
        Receipt {
            start: leaf,
            anchor: leaf,
            entries: vec![],
            local_block: 7,
        }
    }

    #[tokio::test]
    async fn build_derives_consensus_verified_when_all_layers_bind() {
        let l1_anchor = Hash32([2u8; 32]);
        let l1_receipt = single_leaf_receipt(l1_anchor);
        let l2_receipt = single_leaf_receipt(l1_anchor);

        let source = Arc::new(FakeSource {
            receipt: l1_receipt,
            anchor_receipt: l2_receipt.clone(),
        });
        let consensus = Arc::new(FakeConsensus {
            commit: Commit {
                height: 8,
                signed_power: 3,
                total_power: 3,
                root_binding_ok: true,
            },
            app_hash: l2_receipt.anchor,
        });

        let builder = ChainedProofBuilder::new(source, consensus, "mainnet", ProofMode::ProofGrade);
        let proof = builder
            .build("acc://a", Hash32::ZERO, "bvn1", 0, "bvn1")
            .await
            .unwrap();
        assert_eq!(proof.trust_level, certen_types::proof::TrustLevel::ConsensusVerified);
    }

    #[tokio::test]
    async fn anchored_only_degrades_when_l3_fails() {
        let l1_anchor = Hash32([3u8; 32]);
        let l1_receipt = single_leaf_receipt(l1_anchor);
        let l2_receipt = single_leaf_receipt(l1_anchor);

        let source = Arc::new(FakeSource {
            receipt: l1_receipt,
            anchor_receipt: l2_receipt,
        });
        struct FailingConsensus;
        #[async_trait]
        impl ConsensusClient for FailingConsensus {
            async fn get_commit(&self, _height: u64) -> Result<Commit, TransientError> {
                Err(TransientError::Rpc { endpoint: "x".into(), reason: "down".into() })
            }
            async fn get_block_app_hash(&self, _height: u64) -> Result<Hash32, TransientError> {
                Err(TransientError::Rpc { endpoint: "x".into(), reason: "down".into() })
            }
        }

        let builder = ChainedProofBuilder::new(source, Arc::new(FailingConsensus), "mainnet", ProofMode::AnchoredOnly);
        let proof = builder
            .build("acc://a", Hash32::ZERO, "bvn1", 0, "bvn1")
            .await
            .unwrap();
        assert!(proof.l3.is_none());
        assert_eq!(proof.trust_level, certen_types::proof::TrustLevel::DnAnchored);
    }
}
