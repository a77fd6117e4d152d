// Path: crates/codec/src/commitment.rs
//! Operation-id and the three derived commitments (operation, cross-chain,
//! governance), each reduced deterministically to exactly 32 bytes.
//!
//! Commitment determinism is a correctness requirement: two validators
//! with the same inputs must produce byte-identical commitments. The
//! substitution table below picks one deterministic rule per commitment,
//! resolving the asymmetry the source specification left ambiguous (see
//! the design notes on `operation_commitment`).

use sha2::{Digest, Sha256};

use certen_types::hash::Hash32;

use crate::canonical::canonicalize;

/// Computes the stable operation id / 4-blob hash:
/// `sha256(canonical(intent) || canonical(cross_chain) || canonical(governance) || canonical(replay))`.
pub fn operation_id(
    intent_data: &[u8],
    cross_chain_data: &[u8],
    governance_data: &[u8],
    replay_data: &[u8],
) -> Result<Hash32, certen_types::error::ProcessingError> {
    let mut hasher = Sha256::new();
    hasher.update(canonicalize_or_raw(intent_data)?);
    hasher.update(canonicalize_or_raw(cross_chain_data)?);
    hasher.update(canonicalize_or_raw(governance_data)?);
    hasher.update(canonicalize_or_raw(replay_data)?);
    Ok(Hash32(hasher.finalize().into()))
}

/// Canonicalizes `data` if non-empty; empty blobs contribute nothing to
/// the hash state beyond their absence, matching the discovery invariant
/// that an intent with every blob empty is rejected before this is called.
fn canonicalize_or_raw(data: &[u8]) -> Result<Vec<u8>, certen_types::error::ProcessingError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    canonicalize(data)
}

fn sha256_32(data: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash32(hasher.finalize().into())
}

/// Best-available inputs for deriving the three anchor commitments. Any
/// field may be absent; the deterministic substitution table below picks
/// the preferred source when present, falling back otherwise.
#[derive(Debug, Default, Clone)]
pub struct CommitmentInputs {
    /// Account-state hash from L1, preferred source for `operation_commitment`.
    pub account_state_hash: Option<Hash32>,
    /// The source-ledger transaction hash, fallback for `operation_commitment`.
    pub tx_hash: Option<Hash32>,
    /// The source account URL, used with `tx_hash` in the fallback rule.
    pub account_url: Option<String>,

    /// L1's BPT (binary patricia trie) root, preferred for `cross_chain_commitment`.
    pub l1_bpt_root: Option<Hash32>,
    /// Block hash from the anchor, secondary fallback for cross-chain.
    pub anchor_block_hash: Option<Hash32>,
    /// Local block height, used in the final cross-chain fallback.
    pub height: Option<u64>,
    /// Proof id, used in the final cross-chain fallback.
    pub proof_id: Option<String>,

    /// BLS aggregate signature hash, preferred for `governance_root`.
    pub bls_aggregate_signature_hash: Option<Hash32>,
    /// Concatenated validator signatures, secondary fallback.
    pub concatenated_validator_sigs: Option<Vec<u8>>,
    /// A single validator id, used in the final governance fallback.
    pub validator_id: Option<String>,
    /// A status string, used in the final governance fallback.
    pub status: Option<String>,
}

/// Derives `operation_commitment` per the substitution table: prefer the
/// account-state hash from L1; otherwise `sha256(tx_hash || account_url)`.
pub fn operation_commitment(inputs: &CommitmentInputs) -> Hash32 {
    if let Some(h) = inputs.account_state_hash {
        return h;
    }
    let tx_hash = inputs.tx_hash.unwrap_or(Hash32::ZERO);
    let account_url = inputs.account_url.as_deref().unwrap_or("");
    let mut buf = Vec::with_capacity(32 + account_url.len());
    buf.extend_from_slice(tx_hash.as_bytes());
    buf.extend_from_slice(account_url.as_bytes());
    sha256_32(&buf)
}

/// Derives `cross_chain_commitment` per the substitution table: prefer the
/// L1 BPT root; then the anchor's block hash; otherwise
/// `sha256("bpt" || height || proof_id)`.
pub fn cross_chain_commitment(inputs: &CommitmentInputs) -> Hash32 {
    if let Some(h) = inputs.l1_bpt_root {
        return h;
    }
    if let Some(h) = inputs.anchor_block_hash {
        return h;
    }
    let height = inputs.height.unwrap_or(0);
    let proof_id = inputs.proof_id.as_deref().unwrap_or("");
    let mut buf = Vec::new();
    buf.extend_from_slice(b"bpt");
    buf.extend_from_slice(&height.to_be_bytes());
    buf.extend_from_slice(proof_id.as_bytes());
    sha256_32(&buf)
}

/// Derives `governance_root` per the substitution table: prefer the BLS
/// aggregate signature hash; then `sha256(concat(validator_sigs))`;
/// otherwise `sha256(validator_id || status)`.
pub fn governance_root(inputs: &CommitmentInputs) -> Hash32 {
    if let Some(h) = inputs.bls_aggregate_signature_hash {
        return h;
    }
    if let Some(sigs) = &inputs.concatenated_validator_sigs {
        return sha256_32(sigs);
    }
    let validator_id = inputs.validator_id.as_deref().unwrap_or("");
    let status = inputs.status.as_deref().unwrap_or("");
    let mut buf = Vec::new();
    buf.extend_from_slice(validator_id.as_bytes());
    buf.extend_from_slice(status.as_bytes());
    sha256_32(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_id_is_deterministic() {
        let a = operation_id(br#"{"kind":"x"}"#, b"", b"", b"").unwrap();
        let b = operation_id(br#"{"kind":"x"}"#, b"", b"", b"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn operation_id_changes_with_key_order_preserved_semantics() {
        // Same logical object, different source key order: canonicalization
        // must make these produce the same operation id.
        let a = operation_id(br#"{"b":1,"a":2}"#, b"", b"", b"").unwrap();
        let b = operation_id(br#"{"a":2,"b":1}"#, b"", b"", b"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn operation_commitment_falls_back_when_account_hash_absent() {
        let inputs = CommitmentInputs {
            tx_hash: Some(Hash32([1u8; 32])),
            account_url: Some("acc://foo.acme".into()),
            ..Default::default()
        };
        let a = operation_commitment(&inputs);
        let b = operation_commitment(&inputs);
        assert_eq!(a, b);
    }

    #[test]
    fn operation_commitment_prefers_account_state_hash() {
        let preferred = Hash32([9u8; 32]);
        let inputs = CommitmentInputs {
            account_state_hash: Some(preferred),
            tx_hash: Some(Hash32([1u8; 32])),
            account_url: Some("acc://foo.acme".into()),
            ..Default::default()
        };
        assert_eq!(operation_commitment(&inputs), preferred);
    }
}
