// Path: crates/clients/src/target_chain.rs
//! Client contract for the EVM target chain: block height, contract event
//! log filtering, read-only calls, and retried transaction submission.

use async_trait::async_trait;
use serde::Deserialize;

use certen_types::error::TransientError;
use certen_types::hash::Hash32;

use crate::retry::with_retry;

/// Everything recorded about a settled transaction submission, sufficient
/// to reconstruct the on-chain side of an anchor/execute-proof cycle
/// without consulting the target chain again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSubmissionReceipt {
    /// Hash of the submitted transaction.
    pub tx_hash: Hash32,
    /// Block the transaction was mined in.
    pub block_number: u64,
    /// Hash of the block the transaction was mined in.
    pub block_hash: Hash32,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// Total cost in wei: `gas_used * effective_gas_price`.
    pub gas_cost: u128,
}

/// A single decoded contract event log.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractEvent {
    /// Keccak topic0 identifying the event type.
    pub topic0: Hash32,
    /// Raw ABI-encoded event data.
    pub data: Vec<u8>,
    /// Block the event was emitted in.
    pub block_number: u64,
    /// Transaction hash the event was emitted by.
    pub tx_hash: Hash32,
}

/// Read/write access to the target EVM chain's `CertenAnchor` contract.
#[async_trait]
pub trait TargetChainClient: Send + Sync {
    /// Returns the current block number.
    async fn block_number(&self) -> Result<u64, TransientError>;

    /// Returns contract events in `[from_block, to_block]` emitted by the
    /// validator contract.
    async fn filter_logs(&self, from_block: u64, to_block: u64) -> Result<Vec<ContractEvent>, TransientError>;

    /// Performs a read-only ABI-encoded contract call and returns the raw
    /// ABI-encoded return data.
    async fn call_contract(&self, calldata: &[u8]) -> Result<Vec<u8>, TransientError>;

    /// Submits an ABI-encoded transaction, retries until it is accepted
    /// into the mempool, then waits for it to be mined and returns its
    /// settlement receipt. Does not wait for confirmation depth; that is
    /// the confirmation tracker's job.
    async fn send_transaction_with_retry(&self, calldata: &[u8]) -> Result<TxSubmissionReceipt, TransientError>;
}

/// `reqwest`-backed JSON-RPC [`TargetChainClient`].
pub struct JsonRpcTargetChainClient {
    rpc_url: String,
    contract_address: String,
    http: reqwest::Client,
}

impl JsonRpcTargetChainClient {
    /// Builds a client against `rpc_url`, calling the contract deployed at
    /// `contract_address` (`0x`-prefixed, 20-byte hex).
    pub fn new(rpc_url: impl Into<String>, contract_address: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address: contract_address.into(),
            http: reqwest::Client::new(),
        }
    }

    fn transient(op: &str, e: impl std::fmt::Display) -> TransientError {
        TransientError::Rpc {
            endpoint: op.to_string(),
            reason: e.to_string(),
        }
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, TransientError> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            jsonrpc: &'a str,
            id: u64,
            method: &'a str,
            params: serde_json::Value,
        }
        #[derive(Deserialize)]
        struct Res {
            result: Option<serde_json::Value>,
            error: Option<serde_json::Value>,
        }
        let resp = self
            .http
            .post(&self.rpc_url)
            .json(&Req {
                jsonrpc: "2.0",
                id: 1,
                method,
                params,
            })
            .send()
            .await
            .map_err(|e| Self::transient(method, e))?;
        if !resp.status().is_success() {
            return Err(Self::transient(method, resp.status()));
        }
        let r: Res = resp.json().await.map_err(|e| Self::transient(method, e))?;
        if let Some(err) = r.error {
            return Err(Self::transient(method, err));
        }
        r.result.ok_or_else(|| Self::transient(method, "missing result"))
    }
}

#[async_trait]
impl TargetChainClient for JsonRpcTargetChainClient {
    async fn block_number(&self) -> Result<u64, TransientError> {
        with_retry("block_number", || async {
            let result = self.call("eth_blockNumber", serde_json::json!([])).await?;
            let hex_str = result
                .as_str()
                .ok_or_else(|| Self::transient("block_number", "non-string result"))?;
            u64::from_str_radix(hex_str.trim_start_matches("0x"), 16)
                .map_err(|e| Self::transient("block_number", e))
        })
        .await
    }

    async fn filter_logs(&self, from_block: u64, to_block: u64) -> Result<Vec<ContractEvent>, TransientError> {
        with_retry("filter_logs", || async {
            let params = serde_json::json!([{
                "fromBlock": format!("0x{:x}", from_block),
                "toBlock": format!("0x{:x}", to_block),
                "address": self.contract_address,
            }]);
            let result = self.call("eth_getLogs", params).await?;
            let raw: Vec<serde_json::Value> = serde_json::from_value(result)
                .map_err(|e| Self::transient("filter_logs", e))?;
            raw.into_iter()
                .map(|v| decode_log(&v))
                .collect::<Result<Vec<_>, _>>()
        })
        .await
    }

    async fn call_contract(&self, calldata: &[u8]) -> Result<Vec<u8>, TransientError> {
        with_retry("call_contract", || async {
            let params = serde_json::json!([{
                "to": self.contract_address,
                "data": format!("0x{}", hex::encode(calldata)),
            }, "latest"]);
            let result = self.call("eth_call", params).await?;
            let hex_str = result
                .as_str()
                .ok_or_else(|| Self::transient("call_contract", "non-string result"))?;
            hex::decode(hex_str.trim_start_matches("0x")).map_err(|e| Self::transient("call_contract", e))
        })
        .await
    }

    async fn send_transaction_with_retry(&self, calldata: &[u8]) -> Result<TxSubmissionReceipt, TransientError> {
        let tx_hash = with_retry("send_transaction_with_retry", || async {
            let params = serde_json::json!([{
                "to": self.contract_address,
                "data": format!("0x{}", hex::encode(calldata)),
            }]);
            let result = self.call("eth_sendTransaction", params).await?;
            let hex_str = result
                .as_str()
                .ok_or_else(|| Self::transient("send_transaction_with_retry", "non-string result"))?;
            let bytes = hex::decode(hex_str.trim_start_matches("0x"))
                .map_err(|e| Self::transient("send_transaction_with_retry", e))?;
            Hash32::from_slice(&bytes).map_err(|e| Self::transient("send_transaction_with_retry", e))
        })
        .await?;

        with_retry("await_transaction_receipt", || async {
            let params = serde_json::json!([format!("0x{}", hex::encode(tx_hash.as_bytes()))]);
            let result = self.call("eth_getTransactionReceipt", params).await?;
            if result.is_null() {
                return Err(Self::transient("await_transaction_receipt", "transaction not yet mined"));
            }
            decode_receipt(tx_hash, &result)
        })
        .await
    }
}

fn decode_receipt(tx_hash: Hash32, v: &serde_json::Value) -> Result<TxSubmissionReceipt, TransientError> {
    let hex_u64 = |key: &str| -> Result<u64, TransientError> {
        v.get(key)
            .and_then(|b| b.as_str())
            .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok())
            .ok_or_else(|| JsonRpcTargetChainClient::transient("decode_receipt", format!("missing or malformed {key}")))
    };
    let hex_hash = |key: &str| -> Result<Hash32, TransientError> {
        let s = v
            .get(key)
            .and_then(|b| b.as_str())
            .ok_or_else(|| JsonRpcTargetChainClient::transient("decode_receipt", format!("missing {key}")))?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|e| JsonRpcTargetChainClient::transient("decode_receipt", e))?;
        Hash32::from_slice(&bytes).map_err(|e| JsonRpcTargetChainClient::transient("decode_receipt", e))
    };

    let block_number = hex_u64("blockNumber")?;
    let block_hash = hex_hash("blockHash")?;
    let gas_used = hex_u64("gasUsed")?;
    let gas_price = hex_u64("effectiveGasPrice").unwrap_or(0) as u128;

    Ok(TxSubmissionReceipt {
        tx_hash,
        block_number,
        block_hash,
        gas_used,
        gas_cost: gas_used as u128 * gas_price,
    })
}

fn decode_log(v: &serde_json::Value) -> Result<ContractEvent, TransientError> {
    let topics = v
        .get("topics")
        .and_then(|t| t.as_array())
        .ok_or_else(|| JsonRpcTargetChainClient::transient("decode_log", "missing topics"))?;
    let topic0_str = topics
        .first()
        .and_then(|t| t.as_str())
        .ok_or_else(|| JsonRpcTargetChainClient::transient("decode_log", "missing topic0"))?;
    let topic0_bytes = hex::decode(topic0_str.trim_start_matches("0x"))
        .map_err(|e| JsonRpcTargetChainClient::transient("decode_log", e))?;
    let topic0 = Hash32::from_slice(&topic0_bytes).map_err(|e| JsonRpcTargetChainClient::transient("decode_log", e))?;

    let data_str = v.get("data").and_then(|d| d.as_str()).unwrap_or("0x");
    let data = hex::decode(data_str.trim_start_matches("0x")).map_err(|e| JsonRpcTargetChainClient::transient("decode_log", e))?;

    let block_number = v
        .get("blockNumber")
        .and_then(|b| b.as_str())
        .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok())
        .unwrap_or(0);

    let tx_hash_str = v.get("transactionHash").and_then(|t| t.as_str()).unwrap_or("0x");
    let tx_hash_bytes = hex::decode(tx_hash_str.trim_start_matches("0x")).unwrap_or_default();
    let tx_hash = Hash32::from_slice(&tx_hash_bytes).unwrap_or(Hash32::ZERO);

    Ok(ContractEvent {
        topic0,
        data,
        block_number,
        tx_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_log_reads_topic0_and_block_number() {
        let v = serde_json::json!({
            "topics": [format!("0x{}", "ab".repeat(32))],
            "data": "0x1234",
            "blockNumber": "0x10",
            "transactionHash": format!("0x{}", "cd".repeat(32)),
        });
        let ev = decode_log(&v).unwrap();
        assert_eq!(ev.block_number, 16);
        assert_eq!(ev.data, vec![0x12, 0x34]);
    }

    #[test]
    fn decode_receipt_computes_gas_cost() {
        let v = serde_json::json!({
            "blockNumber": "0x64",
            "blockHash": format!("0x{}", "ab".repeat(32)),
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
        });
        let receipt = decode_receipt(Hash32::ZERO, &v).unwrap();
        assert_eq!(receipt.block_number, 100);
        assert_eq!(receipt.gas_used, 21000);
        assert_eq!(receipt.gas_cost, 21000u128 * 1_000_000_000u128);
    }
}
