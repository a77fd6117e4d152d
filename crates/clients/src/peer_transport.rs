// Path: crates/clients/src/peer_transport.rs
//! Transport used to collect BLS partial signatures from peer validators
//! for attestation aggregation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use certen_types::error::TransientError;
use certen_types::hash::Hash32;

use crate::retry::with_retry;

/// A single peer's partial signature over a result hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialAttestation {
    /// The validator's BLS public key, compressed.
    pub validator_id: String,
    /// Compressed G1 signature bytes.
    pub signature: Vec<u8>,
}

/// Transport for requesting and gathering peer validator signatures.
#[async_trait]
pub trait PeerValidatorTransport: Send + Sync {
    /// Asks the peer at `peer_addr` to sign `result_hash`, returning its
    /// partial attestation.
    async fn request_signature(
        &self,
        peer_addr: &str,
        result_hash: Hash32,
    ) -> Result<PartialAttestation, TransientError>;
}

/// `reqwest`-backed [`PeerValidatorTransport`].
pub struct HttpPeerValidatorTransport {
    http: reqwest::Client,
}

impl Default for HttpPeerValidatorTransport {
    fn default() -> Self {
        Self { http: reqwest::Client::new() }
    }
}

impl HttpPeerValidatorTransport {
    /// Builds a transport with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    fn transient(op: &str, e: impl std::fmt::Display) -> TransientError {
        tracing::debug!(target = "certen_clients", op, error = %e, "peer transport failure");
        TransientError::PeerTransport(format!("{op}: {e}"))
    }
}

#[async_trait]
impl PeerValidatorTransport for HttpPeerValidatorTransport {
    async fn request_signature(
        &self,
        peer_addr: &str,
        result_hash: Hash32,
    ) -> Result<PartialAttestation, TransientError> {
        #[derive(Serialize)]
        struct Req {
            result_hash: String,
        }
        with_retry("request_signature", || async {
            let resp = self
                .http
                .post(format!("{peer_addr}/v1/attest/sign"))
                .json(&Req {
                    result_hash: result_hash.to_hex(),
                })
                .send()
                .await
                .map_err(|e| Self::transient("request_signature", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("request_signature", resp.status()));
            }
            resp.json().await.map_err(|e| Self::transient("request_signature", e))
        })
        .await
    }
}
