// Path: crates/attestation/src/aggregator.rs
//! Collects partial BLS signatures from peer validators over a single
//! canonical result hash and aggregates them into an [`AttestationBundle`],
//! rejecting the bundle if the aggregated voting power falls below the
//! 2/3 threshold.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use certen_clients::peer_transport::PeerValidatorTransport;
use certen_crypto::sign::bls::{self, BlsPublicKey, BlsSignature};
use certen_crypto::sign::traits::{SerializableKey, VerifyingKey};
use certen_types::attestation::{Aggregated, AttestationBundle, AttestationDomain};
use certen_types::error::{PolicyError, ProcessingError};
use certen_types::hash::Hash32;

/// A known validator: its peer address, BLS public key, and voting power.
/// Membership and voting power are assumed to come from the consensus
/// validator set already resolved elsewhere; this crate only aggregates.
#[derive(Debug, Clone)]
pub struct ValidatorInfo {
    /// Stable identifier, also used as the key in returned signatures.
    pub validator_id: String,
    /// Address the peer transport dials to request a signature.
    pub peer_addr: String,
    /// The validator's BLS public key.
    pub public_key: BlsPublicKey,
    /// This validator's voting power in the current set.
    pub voting_power: u128,
}

/// Computes the canonical message every validator signs:
/// `sha256(domain || result_hash)`.
pub fn canonical_message(domain: AttestationDomain, result_hash: Hash32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain.tag().as_bytes());
    hasher.update(result_hash.as_bytes());
    hasher.finalize().into()
}

/// Requests signatures from peer validators and aggregates them.
pub struct AttestationAggregator {
    transport: Arc<dyn PeerValidatorTransport>,
    domain: AttestationDomain,
}

impl AttestationAggregator {
    /// Builds an aggregator signing under the given domain.
    pub fn new(transport: Arc<dyn PeerValidatorTransport>, domain: AttestationDomain) -> Self {
        Self { transport, domain }
    }

    /// Requests a partial signature from every validator concurrently,
    /// verifies each against its claimed public key, aggregates the
    /// verified signatures, and checks the 2/3 voting-power threshold.
    ///
    /// Validators that fail to respond or whose signature does not
    /// verify are silently excluded from the aggregate rather than
    /// failing the whole call; only the final threshold check can fail
    /// the bundle.
    pub async fn collect_and_aggregate(
        &self,
        bundle_id: Hash32,
        result_hash: Hash32,
        validators: &[ValidatorInfo],
    ) -> Result<AttestationBundle, ProcessingError> {
        let message = canonical_message(self.domain, result_hash);
        let total_voting_power = validators.iter().map(|v| v.voting_power).sum();

        let responses = futures::future::join_all(
            validators.iter().map(|v| self.request_and_verify(v, result_hash, &message)),
        )
        .await;

        let mut signatures = Vec::new();
        let mut signed_voting_power: u128 = 0;
        let mut validator_count = 0u32;
        for (validator, verified) in validators.iter().zip(responses) {
            match verified {
                Some(sig) => {
                    signatures.push(sig);
                    signed_voting_power += validator.voting_power;
                    validator_count += 1;
                }
                None => {
                    tracing::warn!(validator_id = %validator.validator_id, "attestation signature rejected or unavailable");
                }
            }
        }

        if !bls::threshold_met(signed_voting_power, total_voting_power) {
            return Err(ProcessingError::Policy(PolicyError::ThresholdNotMet {
                signed: signed_voting_power,
                total: total_voting_power,
            }));
        }

        let aggregate = bls::aggregate_signatures(&signatures)
            .map_err(|e| ProcessingError::Other(format!("bls aggregation failed: {e}")))?;

        Ok(AttestationBundle {
            bundle_id,
            result_hash,
            aggregated: Aggregated {
                validator_count,
                signed_voting_power,
                total_voting_power,
                threshold_met: true,
                aggregate_signature: aggregate.to_bytes(),
            },
        })
    }

    async fn request_and_verify(
        &self,
        validator: &ValidatorInfo,
        result_hash: Hash32,
        message: &[u8; 32],
    ) -> Option<BlsSignature> {
        let partial = self
            .transport
            .request_signature(&validator.peer_addr, result_hash)
            .await
            .map_err(|e| tracing::debug!(validator_id = %validator.validator_id, error = %e, "peer did not respond"))
            .ok()?;

        let signature = BlsSignature::from_bytes(&partial.signature)
            .map_err(|e| tracing::warn!(validator_id = %validator.validator_id, error = %e, "malformed partial signature"))
            .ok()?;

        validator
            .public_key
            .verify(message, &signature)
            .map_err(|e| tracing::warn!(validator_id = %validator.validator_id, error = %e, "partial signature failed verification"))
            .ok()?;

        Some(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certen_clients::peer_transport::PartialAttestation;
    use certen_crypto::sign::bls::BlsKeyPair;
    use certen_crypto::sign::traits::{SigningKey, SigningKeyPair};
    use certen_types::error::TransientError;
    use std::collections::HashMap;

    struct FakeTransport {
        keys: HashMap<String, BlsKeyPair>,
        deny: Vec<String>,
    }

    #[async_trait]
    impl PeerValidatorTransport for FakeTransport {
        async fn request_signature(
            &self,
            peer_addr: &str,
            result_hash: Hash32,
        ) -> Result<PartialAttestation, TransientError> {
            if self.deny.iter().any(|d| d == peer_addr) {
                return Err(TransientError::PeerTransport("denied".to_string()));
            }
            let keypair = self.keys.get(peer_addr).expect("test double: unknown peer");
            let message = canonical_message(AttestationDomain::Attestation, result_hash);
            let signature = keypair.private_key().sign(&message).unwrap();
            Ok(PartialAttestation {
                validator_id: peer_addr.to_string(),
                signature: signature.to_bytes(),
            })
        }
    }

    fn validator(id: &str, keypair: &BlsKeyPair, voting_power: u128) -> ValidatorInfo {
        ValidatorInfo {
            validator_id: id.to_string(),
            peer_addr: id.to_string(),
            public_key: keypair.public_key(),
            voting_power,
        }
    }

    #[tokio::test]
    async fn aggregates_when_threshold_met() {
        let keys: Vec<BlsKeyPair> = (0..4).map(|_| BlsKeyPair::generate().unwrap()).collect();
        let mut by_addr = HashMap::new();
        let validators: Vec<ValidatorInfo> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let id = format!("v{i}");
                by_addr.insert(id.clone(), k.clone());
                validator(&id, k, 25)
            })
            .collect();

        let transport = Arc::new(FakeTransport { keys: by_addr, deny: vec![] });
        let aggregator = AttestationAggregator::new(transport, AttestationDomain::Attestation);
        let bundle = aggregator
            .collect_and_aggregate(Hash32([7u8; 32]), Hash32([9u8; 32]), &validators)
            .await
            .unwrap();

        assert_eq!(bundle.aggregated.validator_count, 4);
        assert!(bundle.aggregated.threshold_met);
    }

    #[tokio::test]
    async fn rejects_below_threshold() {
        let keys: Vec<BlsKeyPair> = (0..4).map(|_| BlsKeyPair::generate().unwrap()).collect();
        let mut by_addr = HashMap::new();
        let validators: Vec<ValidatorInfo> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let id = format!("v{i}");
                by_addr.insert(id.clone(), k.clone());
                validator(&id, k, 25)
            })
            .collect();

        let deny = vec!["v0".to_string(), "v1".to_string(), "v2".to_string()];
        let transport = Arc::new(FakeTransport { keys: by_addr, deny });
        let aggregator = AttestationAggregator::new(transport, AttestationDomain::Attestation);
        let result = aggregator
            .collect_and_aggregate(Hash32([7u8; 32]), Hash32([9u8; 32]), &validators)
            .await;

        assert!(matches!(result, Err(ProcessingError::Policy(PolicyError::ThresholdNotMet { .. }))));
    }
}
