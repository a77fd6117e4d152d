// Path: crates/clients/src/consensus.rs
//! Client contract for the consensus layer's commit/app-hash endpoints,
//! used to build the L3 consensus-finality proof layer.

use async_trait::async_trait;
use serde::Deserialize;

use certen_types::error::TransientError;
use certen_types::hash::Hash32;

use crate::retry::with_retry;

/// A signed commit for a given height, as reported by the consensus
/// endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    /// Height the commit is for.
    pub height: u64,
    /// Number of validators who signed this commit.
    pub signed_power: u128,
    /// Total voting power at this height.
    pub total_power: u128,
    /// Whether the block's root binds to the reported app hash.
    pub root_binding_ok: bool,
}

/// Read access to the consensus layer.
#[async_trait]
pub trait ConsensusClient: Send + Sync {
    /// Fetches the commit record (signatures, voting power) for `height`.
    async fn get_commit(&self, height: u64) -> Result<Commit, TransientError>;

    /// Fetches the application state root (app hash) at `height`.
    async fn get_block_app_hash(&self, height: u64) -> Result<Hash32, TransientError>;
}

/// `reqwest`-backed [`ConsensusClient`].
pub struct HttpConsensusClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpConsensusClient {
    /// Builds a client against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transient(op: &str, e: impl std::fmt::Display) -> TransientError {
        TransientError::Rpc {
            endpoint: op.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl ConsensusClient for HttpConsensusClient {
    async fn get_commit(&self, height: u64) -> Result<Commit, TransientError> {
        with_retry("get_commit", || async {
            let resp = self
                .http
                .get(self.endpoint("/v1/consensus/commit"))
                .query(&[("height", height)])
                .send()
                .await
                .map_err(|e| Self::transient("get_commit", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("get_commit", resp.status()));
            }
            resp.json().await.map_err(|e| Self::transient("get_commit", e))
        })
        .await
    }

    async fn get_block_app_hash(&self, height: u64) -> Result<Hash32, TransientError> {
        #[derive(Deserialize)]
        struct R {
            app_hash: String,
        }
        with_retry("get_block_app_hash", || async {
            let resp = self
                .http
                .get(self.endpoint("/v1/consensus/app-hash"))
                .query(&[("height", height)])
                .send()
                .await
                .map_err(|e| Self::transient("get_block_app_hash", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("get_block_app_hash", resp.status()));
            }
            let r: R = resp.json().await.map_err(|e| Self::transient("get_block_app_hash", e))?;
            Hash32::from_hex(&r.app_hash).map_err(|e| Self::transient("get_block_app_hash", e))
        })
        .await
    }
}
