// Path: crates/cli/src/pipeline.rs
//! Wires intent discovery to proof building, cadence batching, and
//! immediate/batched anchor submission for the `run` subcommand.

use std::sync::Arc;

use async_trait::async_trait;

use certen_anchor::AnchorOrchestrator;
use certen_batch::{router, BatchCollector};
use certen_clients::target_chain::TargetChainClient;
use certen_codec::commitment::{self, CommitmentInputs};
use certen_discovery::IntentSink;
use certen_proof::{AuthorityContext, ChainedProofBuilder, GovernanceProofBuilder};
use certen_types::anchor::{Anchor, CertenProof};
use certen_types::batch::{merkle_root, Batch, BatchStatus, TransactionRecord};
use certen_types::confirmation::ConfirmationRecord;
use certen_types::error::{PolicyError, ProcessingError};
use certen_types::hash::Hash32;
use certen_types::intent::{Intent, ProofClass};
use certen_types::proof::{ChainedProof, GovernanceLevel, GovernanceProofWrapper};
use certen_types::repository::{AnchorRepository, ConfirmationRepository, ProofRepository, StatusRepository};
use certen_types::Result;

/// Unix-epoch nanoseconds, used for batch aging and anchor timestamps.
/// The pipeline is the one caller of `SystemTime::now`; builders and
/// repositories take timestamps as plain arguments so they stay
/// deterministic and testable.
pub fn now_nanos() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

/// Submits a closed batch to the target chain: resolves a collision-free
/// bundle id, derives the three anchor commitments, submits both on-chain
/// calls, and records the anchor plus its initial (zero-depth)
/// confirmation state.
pub struct AnchorSubmitter<C: TargetChainClient + ?Sized> {
    orchestrator: AnchorOrchestrator<C>,
    anchors: Arc<dyn AnchorRepository>,
    confirmations: Arc<dyn ConfirmationRepository>,
    proofs: Arc<dyn ProofRepository>,
}

impl<C: TargetChainClient + ?Sized> AnchorSubmitter<C> {
    /// Builds a submitter that anchors as `validator_address`.
    pub fn new(
        target: Arc<C>,
        anchors: Arc<dyn AnchorRepository>,
        confirmations: Arc<dyn ConfirmationRepository>,
        proofs: Arc<dyn ProofRepository>,
        validator_address: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator: AnchorOrchestrator::new(target, validator_address),
            anchors,
            confirmations,
            proofs,
        }
    }

    /// Submits `batch`, which must already be `Closed` with a computed
    /// merkle root, as an on-chain anchor. Returns the resolved bundle id.
    pub async fn submit_batch(&self, batch: &Batch) -> std::result::Result<Hash32, ProcessingError> {
        let root = batch
            .merkle_root
            .ok_or_else(|| ProcessingError::Other("cannot anchor a batch with no merkle root".into()))?;

        let first = batch.records.first();
        let inputs = CommitmentInputs {
            tx_hash: first.map(|r| r.accum_tx_hash),
            account_url: first.map(|r| r.account_url.clone()),
            height: Some(batch.sizes as u64),
            proof_id: Some(batch.batch_id.to_hex()),
            ..Default::default()
        };
        let op = commitment::operation_commitment(&inputs);
        let cc = commitment::cross_chain_commitment(&inputs);
        let gov = commitment::governance_root(&inputs);

        let anchors = self.anchors.clone();
        let bundle_id = self
            .orchestrator
            .resolve_bundle_id(batch.batch_id, |candidate| {
                let anchors = anchors.clone();
                async move { anchors.exists_and_valid(&candidate).await.unwrap_or(false) }
            })
            .await
            .map_err(|e| ProcessingError::Other(e.to_string()))?;

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut anchor = Anchor {
            bundle_id,
            operation_commitment: op,
            cross_chain_commitment: cc,
            governance_root: gov,
            accumulate_block_height: batch.sizes as u64,
            timestamp: now,
            validator_address: self.orchestrator.validator_address().to_string(),
            valid: true,
            batch_id: batch.batch_id,
            create_anchor_tx_hash: Hash32::ZERO,
            create_anchor_block: 0,
            execute_proof_tx_hash: Hash32::ZERO,
            execute_proof_block: 0,
            gas_used: 0,
            gas_cost: 0,
        };
        let create_receipt = self.orchestrator.create_anchor(&anchor).await?;
        anchor.create_anchor_tx_hash = create_receipt.tx_hash;
        anchor.create_anchor_block = create_receipt.block_number;

        let expected_root = Anchor::expected_merkle_root(&op, &cc, &gov);
        let proof = CertenProof {
            transaction_hash: root,
            merkle_root: expected_root,
            proof_hashes: batch.leaf_hashes.clone(),
            leaf_hash: root,
            governance_proof: Vec::new(),
            bls_proof: Vec::new(),
            commitments: (op, cc, gov),
            expiration_time: now + 3600,
            metadata: Vec::new(),
        };
        let execute_receipt = self.orchestrator.execute_comprehensive_proof(&proof).await?;
        anchor.execute_proof_tx_hash = execute_receipt.tx_hash;
        anchor.execute_proof_block = execute_receipt.block_number;
        anchor.gas_used = create_receipt.gas_used + execute_receipt.gas_used;
        anchor.gas_cost = create_receipt.gas_cost + execute_receipt.gas_cost;

        self.anchors.put(&anchor).await?;
        self.proofs.put(&bundle_id, &proof).await?;

        self.confirmations
            .put(&ConfirmationRecord {
                anchor_id: bundle_id,
                block_number: execute_receipt.block_number,
                confirmations: 0,
                r#final: false,
                block_hash: execute_receipt.block_hash,
            })
            .await?;

        Ok(bundle_id)
    }
}

/// Drives one discovered intent through chained-proof building, G0
/// governance proof generation, and routing to either the immediate or
/// cadence-batched anchor path.
pub struct IntentDriver<C: TargetChainClient + ?Sized> {
    pub proof_builder: Arc<ChainedProofBuilder>,
    pub collector: Arc<BatchCollector>,
    pub status: Arc<dyn StatusRepository>,
    pub anchor_submitter: Arc<AnchorSubmitter<C>>,
    pub chain_name: String,
    pub chain_index: u64,
}

#[async_trait]
impl<C: TargetChainClient + ?Sized + Send + Sync + 'static> IntentSink for IntentDriver<C> {
    async fn accept(&self, mut intent: Intent) -> Result<()> {
        if intent.all_blobs_empty() {
            tracing::debug!(target = "certen_cli", "rejecting intent with no canonical blobs");
            return Ok(());
        }

        let intent_id = certen_codec::commitment::operation_id(
            &intent.intent_data,
            &intent.cross_chain_data,
            &intent.governance_data,
            &intent.replay_data,
        )?;
        intent.intent_id = Some(intent_id);

        if !self.status.mark_in_progress(&intent_id).await? {
            tracing::debug!(target = "certen_cli", intent_id = %intent_id.to_hex(), "already processed or in flight, skipping");
            return Ok(());
        }

        match self.process(&intent, intent_id).await {
            Ok(()) => self.status.mark_completed(&intent_id).await?,
            Err(e) => {
                tracing::warn!(target = "certen_cli", intent_id = %intent_id.to_hex(), error = %e, "intent processing failed, marking for retry");
                self.status.mark_failed(&intent_id).await?;
            }
        }
        Ok(())
    }
}

impl<C: TargetChainClient + ?Sized + Send + Sync + 'static> IntentDriver<C> {
    async fn process(&self, intent: &Intent, intent_id: Hash32) -> std::result::Result<(), ProcessingError> {
        let chained = self
            .proof_builder
            .build(&intent.account_url, intent.transaction_hash, &self.chain_name, self.chain_index, &intent.partition)
            .await?;

        let g0 = GovernanceProofBuilder::build_g0(&chained.l1, intent.transaction_hash, &intent.organization_adi);
        let route = router::route(&intent.cross_chain_data);

        let (gov_wrapper, gov_level) = match route {
            // On-demand intents must clear their governance authority
            // before anchoring immediately; there is no later batch cycle
            // to catch a missing or insufficient signature set.
            router::Route::Immediate => {
                let ctx = parse_authority_context(&chained, &intent.governance_data)
                    .ok_or(ProcessingError::Policy(PolicyError::MissingProofComponent("authorization")))?;
                self.escalate(g0, ctx, &intent.governance_data)?
            }
            router::Route::Batched => match parse_authority_context(&chained, &intent.governance_data) {
                Some(ctx) => self.escalate(g0, ctx, &intent.governance_data)?,
                None => (GovernanceProofBuilder::wrap_g0(g0), GovernanceLevel::G0),
            },
        };

        let record = TransactionRecord {
            accum_tx_hash: intent.transaction_hash,
            account_url: intent.account_url.clone(),
            tx_hash: intent_id,
            intent_type: "intent".to_string(),
            intent_data: intent.intent_data.clone(),
            chained_proof: Some(chained),
            gov_proof: Some(gov_wrapper),
            gov_level: Some(gov_level),
        };

        match route {
            router::Route::Immediate => {
                let now = now_nanos();
                let mut batch = Batch::new(intent_id, ProofClass::OnDemand, now);
                batch.leaf_hashes.push(record.tx_hash);
                batch.records.push(record);
                batch.sizes = 1;
                batch.merkle_root = merkle_root(&batch.leaf_hashes);
                batch.status = BatchStatus::Closed;
                batch.closed_at = Some(now);
                self.anchor_submitter.submit_batch(&batch).await?;
            }
            router::Route::Batched => {
                self.collector.add(&intent.organization_adi, record, now_nanos())?;
            }
        }
        Ok(())
    }

    /// Escalates a completed G0 proof to G1, then to G2 if the outcome
    /// payload (the governance blob itself) canonicalizes. A G1 whose
    /// threshold isn't met is kept at G1 rather than rejected here; only
    /// the on-demand path in `process` treats an unreachable G1 as fatal.
    fn escalate(
        &self,
        g0: certen_types::proof::G0Proof,
        ctx: AuthorityContext,
        outcome_payload: &[u8],
    ) -> std::result::Result<(GovernanceProofWrapper, GovernanceLevel), ProcessingError> {
        let g1 = GovernanceProofBuilder::build_g1(g0, ctx)?;
        if !g1.threshold_met() {
            return Ok((GovernanceProofBuilder::wrap_g1(g1), GovernanceLevel::G1));
        }
        match GovernanceProofBuilder::build_g2(g1.clone(), outcome_payload) {
            Ok(g2) => Ok((GovernanceProofBuilder::wrap_g2(g2), GovernanceLevel::G2)),
            Err(_) => Ok((GovernanceProofBuilder::wrap_g1(g1), GovernanceLevel::G1)),
        }
    }
}

/// Parses the `"authorization"` object a governance blob carries (see
/// `classify::classify_blob`'s sniffing convention) into an
/// [`AuthorityContext`], using the transaction's own L1 receipt as the
/// key-page inclusion path.
fn parse_authority_context(chained: &ChainedProof, governance_data: &[u8]) -> Option<AuthorityContext> {
    let value: serde_json::Value = serde_json::from_slice(governance_data).ok()?;
    let auth = value.get("authorization")?.as_object()?;
    let authority_address = auth.get("signer")?.as_str()?.to_string();
    let provided_signatures = auth.get("provided_signatures")?.as_u64()? as u32;
    let required_signatures = auth.get("required_signatures")?.as_u64()? as u32;
    Some(AuthorityContext {
        key_page_path: chained.l1.receipt.clone(),
        authority_address,
        provided_signatures,
        required_signatures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use certen_types::proof::{Layer1, Layer2, TrustLevel};
    use certen_types::receipt::Receipt;

    fn sample_chained() -> ChainedProof {
        let receipt = Receipt { start: Hash32::ZERO, anchor: Hash32([7u8; 32]), entries: vec![], local_block: 1 };
        ChainedProof {
            l1: Layer1 {
                scope: "acc://a".into(),
                chain_name: "main".into(),
                chain_index: 0,
                leaf: Hash32::ZERO,
                anchor: Hash32::ZERO,
                receipt,
                source_partition: "bvn1".into(),
                local_block: 1,
            },
            l2: Layer2 {
                start: Hash32::ZERO,
                anchor: Hash32::ZERO,
                receipt: Receipt { start: Hash32::ZERO, anchor: Hash32::ZERO, entries: vec![], local_block: 1 },
                local_block: 1,
                scope: "acc://dn.acme/anchors".into(),
            },
            l3: None,
            trust_level: TrustLevel::PartitionTrust,
        }
    }

    #[test]
    fn parses_well_formed_authorization_blob() {
        let governance_data = br#"{"authorization":{"signer":"acc://a/book/1","provided_signatures":2,"required_signatures":2}}"#;
        let ctx = parse_authority_context(&sample_chained(), governance_data).unwrap();
        assert_eq!(ctx.authority_address, "acc://a/book/1");
        assert_eq!(ctx.provided_signatures, 2);
        assert_eq!(ctx.required_signatures, 2);
        assert_eq!(ctx.key_page_path.anchor, Hash32([7u8; 32]));
    }

    #[test]
    fn missing_authorization_object_yields_none() {
        assert!(parse_authority_context(&sample_chained(), br#"{"nonce":1}"#).is_none());
    }

    #[test]
    fn empty_blob_yields_none() {
        assert!(parse_authority_context(&sample_chained(), b"").is_none());
    }
}
