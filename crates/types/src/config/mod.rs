// Path: crates/types/src/config/mod.rs
//! Flat, `serde`-deserializable runtime configuration for the validator.

use serde::{Deserialize, Serialize};

use crate::proof::ProofMode;

/// Endpoint and credential configuration, recognized from a TOML config
/// file or environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// The source ledger's RPC endpoint.
    pub source_endpoint: String,
    /// The target EVM chain's RPC endpoint.
    pub target_endpoint: String,
    /// The CometBFT-style consensus endpoint.
    pub consensus_endpoint: String,
    /// The EVM chain id the anchor contract is deployed on.
    pub target_chain_id: u64,
    /// The anchor contract's address, 20 bytes hex-encoded with `0x` prefix.
    pub contract_address: String,
    /// Reference to the validator's Ed25519 signing key (seed or full key).
    pub ed25519_key_ref: String,
    /// Reference to the validator's BLS12-381 signing seed.
    pub bls_seed_ref: String,
}

/// Polling cadence configuration for the long-running loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Discovery's block polling interval, in seconds. Default 5s.
    #[serde(default = "default_block_poll_interval_secs")]
    pub block_poll_interval_secs: u64,
    /// Event watcher's polling interval, in seconds. Default 15s.
    #[serde(default = "default_event_poll_interval_secs")]
    pub event_poll_interval_secs: u64,
    /// Confirmation tracker's polling interval, in seconds. Default 30s.
    #[serde(default = "default_confirmation_interval_secs")]
    pub confirmation_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            block_poll_interval_secs: default_block_poll_interval_secs(),
            event_poll_interval_secs: default_event_poll_interval_secs(),
            confirmation_interval_secs: default_confirmation_interval_secs(),
        }
    }
}

fn default_block_poll_interval_secs() -> u64 {
    5
}
fn default_event_poll_interval_secs() -> u64 {
    15
}
fn default_confirmation_interval_secs() -> u64 {
    30
}

/// Batch collector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum record count before a cadence batch closes. Default 100.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Maximum batch age in seconds before it closes. Default 300s (5min).
    #[serde(default = "default_max_batch_age_secs")]
    pub max_batch_age_secs: u64,
    /// Minimum record count required before a batch is eligible to close
    /// on age alone. Default 1.
    #[serde(default = "default_min_batch_size")]
    pub min_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            max_batch_age_secs: default_max_batch_age_secs(),
            min_batch_size: default_min_batch_size(),
        }
    }
}

fn default_max_batch_size() -> usize {
    100
}
fn default_max_batch_age_secs() -> u64 {
    300
}
fn default_min_batch_size() -> usize {
    1
}

/// Consensus and attestation threshold configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Timeout for a single BFT consensus query, in seconds. Default 60s.
    #[serde(default = "default_bft_timeout_secs")]
    pub bft_timeout_secs: u64,
    /// Confirmation depth required for anchor finality. Default 12.
    #[serde(default = "default_required_confirmations")]
    pub required_confirmations: u64,
    /// The quorum fraction numerator/denominator, fixed at 2/3 by design.
    #[serde(default = "default_quorum_numerator")]
    pub quorum_numerator: u64,
    /// The quorum fraction denominator.
    #[serde(default = "default_quorum_denominator")]
    pub quorum_denominator: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            bft_timeout_secs: default_bft_timeout_secs(),
            required_confirmations: default_required_confirmations(),
            quorum_numerator: default_quorum_numerator(),
            quorum_denominator: default_quorum_denominator(),
        }
    }
}

fn default_bft_timeout_secs() -> u64 {
    60
}
fn default_required_confirmations() -> u64 {
    12
}
fn default_quorum_numerator() -> u64 {
    2
}
fn default_quorum_denominator() -> u64 {
    3
}

/// Discovery-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Bootstrap fallback height when no checkpoint is persisted.
    pub min_start_height: u64,
    /// Maximum number of blocks that may be enqueued/in-flight at once.
    /// Configurable up to 2000 to handle restart backlogs. Default 2000.
    #[serde(default = "default_max_concurrent_blocks")]
    pub max_concurrent_blocks: u64,
    /// Size of the block-processing worker pool. Default 3.
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
}

fn default_max_concurrent_blocks() -> u64 {
    2000
}
fn default_worker_pool_size() -> usize {
    3
}

/// Feature flags toggling optional behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeatureFlags {
    /// Route all anchor submissions through the unified orchestrator path.
    #[serde(default)]
    pub use_unified_orchestrator: bool,
    /// Enable multi-chain target routing.
    #[serde(default)]
    pub enable_multi_chain: bool,
    /// Fall back to legacy single-step anchoring if the unified path fails.
    #[serde(default)]
    pub fallback_to_legacy: bool,
}

/// A peer validator known to this validator's attestation round, as
/// configured rather than discovered (peer membership is out of scope).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerValidatorConfig {
    /// Stable identifier for the peer (matches its BLS public key id).
    pub validator_id: String,
    /// The peer's attestation transport address.
    pub peer_addr: String,
    /// The peer's BLS12-381 public key, compressed and hex-encoded.
    pub bls_public_key_hex: String,
    /// The peer's voting power.
    pub voting_power: u128,
}

/// The full, flat validator configuration, as loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// RPC endpoints, chain id, contract address, and key references.
    pub endpoints: EndpointConfig,
    /// Polling cadence for the long-running loops.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Batch sizing and aging thresholds.
    #[serde(default)]
    pub batch: BatchConfig,
    /// BFT timeout, confirmation depth, and quorum fraction.
    #[serde(default)]
    pub consensus: ConsensusConfig,
    /// Discovery bootstrap and concurrency limits.
    pub discovery: DiscoveryConfig,
    /// Whether chained proofs require full consensus binding.
    #[serde(default = "default_proof_mode")]
    pub proof_mode: ProofMode,
    /// Optional behavior toggles.
    #[serde(default)]
    pub features: FeatureFlags,
    /// Peer validators participating in BLS attestation aggregation.
    #[serde(default)]
    pub validators: Vec<PeerValidatorConfig>,
}

fn default_proof_mode() -> ProofMode {
    ProofMode::AnchoredOnly
}

impl ValidatorConfig {
    /// Validates cross-field semantic constraints not expressible through
    /// `serde` defaults alone.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoints.source_endpoint.is_empty() {
            return Err("Configuration Error: 'endpoints.source_endpoint' must not be empty.".to_string());
        }
        if self.endpoints.target_endpoint.is_empty() {
            return Err("Configuration Error: 'endpoints.target_endpoint' must not be empty.".to_string());
        }
        if !self.endpoints.contract_address.starts_with("0x") || self.endpoints.contract_address.len() != 42 {
            return Err(format!(
                "Configuration Error: 'endpoints.contract_address' must be a 20-byte 0x-prefixed address, got '{}'.",
                self.endpoints.contract_address
            ));
        }
        if self.batch.max_batch_size == 0 {
            return Err("Configuration Error: 'batch.max_batch_size' must be greater than 0.".to_string());
        }
        if self.discovery.worker_pool_size == 0 {
            return Err("Configuration Error: 'discovery.worker_pool_size' must be greater than 0.".to_string());
        }
        if self.discovery.max_concurrent_blocks > 2000 {
            return Err("Configuration Error: 'discovery.max_concurrent_blocks' must not exceed 2000.".to_string());
        }
        Ok(())
    }
}
