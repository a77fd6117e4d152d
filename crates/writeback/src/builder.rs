// Path: crates/writeback/src/builder.rs
//! Assembles and Ed25519-signs the synthetic write-back transaction closing
//! out one proof cycle.

use sha2::{Digest, Sha256};

use certen_codec::canonical::canonicalize_value;
use certen_crypto::sign::eddsa::Ed25519KeyPair;
use certen_crypto::sign::traits::{SerializableKey, SigningKey, SigningKeyPair};
use certen_types::error::ProcessingError;
use certen_types::hash::Hash32;
use certen_types::writeback::{ComprehensiveDataEntry, SyntheticWriteBackTransaction, WriteBackBody};

/// Builds and signs synthetic write-back transactions under a single
/// validator signing identity.
pub struct WriteBackBuilder {
    signing_key: Ed25519KeyPair,
    principal: String,
}

impl WriteBackBuilder {
    /// Builds a builder signing as `principal` with `signing_key`. Accepts
    /// either a full key pair or one derived from a raw seed via
    /// [`Ed25519KeyPair::from_seed`].
    pub fn new(signing_key: Ed25519KeyPair, principal: impl Into<String>) -> Self {
        Self { signing_key, principal: principal.into() }
    }

    /// Assembles a [`SyntheticWriteBackTransaction`]: canonicalizes the
    /// body, derives `tx_hash`, and signs it with the validator's Ed25519
    /// key.
    pub fn build(
        &self,
        bundle_id: Hash32,
        result_hash: Hash32,
        attestation_proof: Hash32,
        data_entry: ComprehensiveDataEntry,
    ) -> Result<SyntheticWriteBackTransaction, ProcessingError> {
        let proof_cycle_result = if data_entry.anchor_final { "finalized" } else { "anchored" }.to_string();
        let external_chain_proof_summary =
            if data_entry.verification_failed { "verification_failed".to_string() } else { "verified".to_string() };

        let body = WriteBackBody { proof_cycle_result, external_chain_proof_summary, data_entry };

        let body_value = serde_json::to_value(&body)
            .map_err(|e| ProcessingError::Other(format!("write-back body serialization failed: {e}")))?;
        let canonical_body = canonicalize_value(&body_value)?;
        let body_hash = Hash32(Sha256::digest(&canonical_body).into());

        let tx_hash = SyntheticWriteBackTransaction::compute_tx_hash(
            "write_back",
            &bundle_id,
            &result_hash,
            &self.principal,
            &body_hash,
        );

        let signature = self
            .signing_key
            .private_key()
            .sign(tx_hash.as_bytes())
            .map_err(|e| ProcessingError::Other(format!("write-back signing failed: {e}")))?;

        let tx_id = Hash32(Sha256::digest([tx_hash.as_bytes(), uuid::Uuid::new_v4().as_bytes()].concat()).into());

        Ok(SyntheticWriteBackTransaction {
            tx_id,
            tx_hash,
            principal: self.principal.clone(),
            body,
            signatures: vec![signature.to_bytes()],
            attestation_proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certen_types::writeback::ComprehensiveDataEntry;

    fn sample_entry() -> ComprehensiveDataEntry {
        ComprehensiveDataEntry {
            intent_id: Hash32::ZERO,
            source_transaction_hash: Hash32::ZERO,
            account_url: "acc://foo.acme".to_string(),
            partition: "p1".to_string(),
            organization_adi: "acme".to_string(),
            create_anchor_selector: [0u8; 4],
            create_anchor_address: "0xabc".to_string(),
            execute_proof_selector: [0u8; 4],
            execute_proof_address: "0xabc".to_string(),
            final_target_address: "0xdef".to_string(),
            final_target_value: 0,
            create_anchor_tx_hash: Hash32::ZERO,
            create_anchor_block: 1,
            execute_proof_tx_hash: Hash32::ZERO,
            execute_proof_block: 2,
            gas_used: 21000,
            events_hash: Hash32::ZERO,
            verification_failed: false,
            state_root: Hash32::ZERO,
            receipts_root: Hash32::ZERO,
            transactions_root: Hash32::ZERO,
            governance_proof_reference: Hash32::ZERO,
            bundle_id: Hash32::ZERO,
            operation_commitment: Hash32::ZERO,
            cross_chain_commitment: Hash32::ZERO,
            governance_root: Hash32::ZERO,
            result_hash: Hash32::ZERO,
            attestation_validator_count: 4,
            attestation_threshold_met: true,
            previous_result_hash: None,
            sequence_number: 1,
            confirmations_at_writeback: 12,
            anchor_final: true,
        }
    }

    #[test]
    fn build_produces_matching_tx_hash_and_nonempty_signature() {
        let builder = WriteBackBuilder::new(Ed25519KeyPair::generate().unwrap(), "acc://foo.acme/book/1");
        let tx = builder.build(Hash32([1u8; 32]), Hash32([2u8; 32]), Hash32([3u8; 32]), sample_entry()).unwrap();

        assert_eq!(tx.signatures.len(), 1);
        assert!(!tx.signatures[0].is_empty());

        let body_value = serde_json::to_value(&tx.body).unwrap();
        let canonical_body = canonicalize_value(&body_value).unwrap();
        let body_hash = Hash32(Sha256::digest(&canonical_body).into());
        let expected = SyntheticWriteBackTransaction::compute_tx_hash(
            "write_back",
            &Hash32([1u8; 32]),
            &Hash32([2u8; 32]),
            "acc://foo.acme/book/1",
            &body_hash,
        );
        assert_eq!(tx.tx_hash, expected);
    }

    #[test]
    fn build_is_deterministic_given_same_seed_and_inputs() {
        let seed = [7u8; 32];
        let builder_a = WriteBackBuilder::new(Ed25519KeyPair::from_seed(&seed).unwrap(), "acc://foo.acme/book/1");
        let builder_b = WriteBackBuilder::new(Ed25519KeyPair::from_seed(&seed).unwrap(), "acc://foo.acme/book/1");

        let tx_a = builder_a.build(Hash32([1u8; 32]), Hash32([2u8; 32]), Hash32([3u8; 32]), sample_entry()).unwrap();
        let tx_b = builder_b.build(Hash32([1u8; 32]), Hash32([2u8; 32]), Hash32([3u8; 32]), sample_entry()).unwrap();

        assert_eq!(tx_a.tx_hash, tx_b.tx_hash);
        assert_eq!(tx_a.signatures, tx_b.signatures);
    }
}
