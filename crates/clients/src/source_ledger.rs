// Path: crates/clients/src/source_ledger.rs
//! Client contract for the observed source ledger: block/transaction
//! discovery reads, account/chain-entry proof reads, and synthetic
//! transaction write-back.

use async_trait::async_trait;
use serde::Deserialize;

use certen_types::error::TransientError;
use certen_types::hash::Hash32;
use certen_types::intent::Intent;
use certen_types::receipt::Receipt;
use certen_types::status::IntentStatus;

use crate::retry::{with_retry, MAX_ATTEMPTS};

/// A tagged transaction discovered at a given block height, before it has
/// been classified into intent/cross-chain/governance/replay blobs.
#[derive(Debug, Clone, Deserialize)]
pub struct TaggedTransaction {
    /// Source-chain transaction hash.
    pub tx_hash: Hash32,
    /// Account the transaction was recorded against.
    pub account_url: String,
    /// Block height the transaction was recorded at.
    pub block_height: u64,
}

/// Read and write access to the source ledger.
#[async_trait]
pub trait SourceLedgerClient: Send + Sync {
    /// Returns the highest block height the source ledger has produced.
    async fn get_latest_block(&self) -> Result<u64, TransientError>;

    /// Searches a block range for transactions carrying the discovery tag.
    async fn search_tagged_transactions(
        &self,
        from_height: u64,
        to_height: u64,
    ) -> Result<Vec<TaggedTransaction>, TransientError>;

    /// Fetches an account's intent blobs together with its L1 inclusion
    /// receipt.
    async fn query_account_with_receipt(
        &self,
        account_url: &str,
        tx_hash: Hash32,
    ) -> Result<(Intent, Receipt), TransientError>;

    /// Fetches a single chain-entry value (used for L2 directory-anchor
    /// receipts) at or below `height`.
    async fn query_chain_entry(
        &self,
        chain_name: &str,
        height: u64,
    ) -> Result<(Hash32, Receipt), TransientError>;

    /// Submits a signed synthetic write-back transaction, returning its
    /// source-ledger transaction hash.
    async fn submit_synthetic_transaction(&self, signed_body: &[u8]) -> Result<Hash32, TransientError>;

    /// Polls the delivery status of a previously submitted transaction.
    async fn get_transaction_status(&self, tx_hash: Hash32) -> Result<IntentStatus, TransientError>;
}

/// `reqwest`-backed [`SourceLedgerClient`], retrying transient failures
/// (timeouts, 429, 5xx) with the shared backoff schedule.
pub struct HttpSourceLedgerClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpSourceLedgerClient {
    /// Builds a client against `base_url` (no trailing slash expected).
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
impl SourceLedgerClient for HttpSourceLedgerClient {
    async fn get_latest_block(&self) -> Result<u64, TransientError> {
        #[derive(Deserialize)]
        struct R {
            height: u64,
        }
        with_retry("get_latest_block", || async {
            let resp = self
                .http
                .get(self.endpoint("/v1/source/latest-block"))
                .send()
                .await
                .map_err(|e| Self::transient("get_latest_block", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("get_latest_block", resp.status()));
            }
            let r: R = resp
                .json()
                .await
                .map_err(|e| Self::transient("get_latest_block", e))?;
            Ok(r.height)
        })
        .await
    }

    async fn search_tagged_transactions(
        &self,
        from_height: u64,
        to_height: u64,
    ) -> Result<Vec<TaggedTransaction>, TransientError> {
        with_retry("search_tagged_transactions", || async {
            let resp = self
                .http
                .get(self.endpoint("/v1/source/tagged-transactions"))
                .query(&[("from", from_height), ("to", to_height)])
                .send()
                .await
                .map_err(|e| Self::transient("search_tagged_transactions", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("search_tagged_transactions", resp.status()));
            }
            resp.json()
                .await
                .map_err(|e| Self::transient("search_tagged_transactions", e))
        })
        .await
    }

    async fn query_account_with_receipt(
        &self,
        account_url: &str,
        tx_hash: Hash32,
    ) -> Result<(Intent, Receipt), TransientError> {
        #[derive(Deserialize)]
        struct R {
            intent: Intent,
            receipt: Receipt,
        }
        with_retry("query_account_with_receipt", || async {
            let resp = self
                .http
                .get(self.endpoint("/v1/source/account"))
                .query(&[("account_url", account_url), ("tx_hash", &tx_hash.to_hex())])
                .send()
                .await
                .map_err(|e| Self::transient("query_account_with_receipt", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("query_account_with_receipt", resp.status()));
            }
            let r: R = resp
                .json()
                .await
                .map_err(|e| Self::transient("query_account_with_receipt", e))?;
            Ok((r.intent, r.receipt))
        })
        .await
    }

    async fn query_chain_entry(
        &self,
        chain_name: &str,
        height: u64,
    ) -> Result<(Hash32, Receipt), TransientError> {
        #[derive(Deserialize)]
        struct R {
            entry: Hash32,
            receipt: Receipt,
        }
        with_retry("query_chain_entry", || async {
            let resp = self
                .http
                .get(self.endpoint("/v1/source/chain-entry"))
                .query(&[("chain", chain_name), ("height", &height.to_string())])
                .send()
                .await
                .map_err(|e| Self::transient("query_chain_entry", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("query_chain_entry", resp.status()));
            }
            let r: R = resp
                .json()
                .await
                .map_err(|e| Self::transient("query_chain_entry", e))?;
            Ok((r.entry, r.receipt))
        })
        .await
    }

    async fn submit_synthetic_transaction(&self, signed_body: &[u8]) -> Result<Hash32, TransientError> {
        #[derive(serde::Serialize)]
        struct Q<'a> {
            body_hex: &'a str,
        }
        #[derive(Deserialize)]
        struct R {
            tx_hash: String,
        }
        let body_hex = hex::encode(signed_body);
        with_retry("submit_synthetic_transaction", || async {
            let resp = self
                .http
                .post(self.endpoint("/v1/source/submit"))
                .json(&Q { body_hex: &body_hex })
                .send()
                .await
                .map_err(|e| Self::transient("submit_synthetic_transaction", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("submit_synthetic_transaction", resp.status()));
            }
            let r: R = resp
                .json()
                .await
                .map_err(|e| Self::transient("submit_synthetic_transaction", e))?;
            Hash32::from_hex(&r.tx_hash).map_err(|e| Self::transient("submit_synthetic_transaction", e))
        })
        .await
    }

    async fn get_transaction_status(&self, tx_hash: Hash32) -> Result<IntentStatus, TransientError> {
        #[derive(Deserialize)]
        struct R {
            status: IntentStatus,
        }
        with_retry("get_transaction_status", || async {
            let resp = self
                .http
                .get(self.endpoint("/v1/source/transaction-status"))
                .query(&[("tx_hash", tx_hash.to_hex())])
                .send()
                .await
                .map_err(|e| Self::transient("get_transaction_status", e))?;
            if !resp.status().is_success() {
                return Err(Self::transient("get_transaction_status", resp.status()));
            }
            let r: R = resp
                .json()
                .await
                .map_err(|e| Self::transient("get_transaction_status", e))?;
            Ok(r.status)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_budget_is_shared_constant() {
        assert_eq!(MAX_ATTEMPTS, 5);
    }
}
