// Path: crates/cli/src/commands/config.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use certen_types::config::{
    BatchConfig, ConsensusConfig, DiscoveryConfig, EndpointConfig, FeatureFlags, PollingConfig,
    ValidatorConfig,
};
use certen_types::proof::ProofMode;

#[derive(Parser, Debug)]
pub struct ConfigCmdArgs {
    #[clap(subcommand)]
    pub command: ConfigSubCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubCommands {
    /// Generate a starter `validator.toml` with spec-default values.
    New {
        #[clap(long, default_value = "validator.toml")]
        out: PathBuf,
        #[clap(long, default_value = "1")]
        target_chain_id: u64,
    },
}

pub fn run(args: ConfigCmdArgs) -> Result<()> {
    match args.command {
        ConfigSubCommands::New { out, target_chain_id } => {
            let cfg = ValidatorConfig {
                endpoints: EndpointConfig {
                    source_endpoint: "https://source.example.com/v2".into(),
                    target_endpoint: "https://target-evm.example.com".into(),
                    consensus_endpoint: "https://consensus.example.com".into(),
                    target_chain_id,
                    contract_address: "0x0000000000000000000000000000000000000000".into(),
                    ed25519_key_ref: "env:CERTEN_ED25519_SEED".into(),
                    bls_seed_ref: "env:CERTEN_BLS_SEED".into(),
                },
                polling: PollingConfig::default(),
                batch: BatchConfig::default(),
                consensus: ConsensusConfig::default(),
                discovery: DiscoveryConfig {
                    min_start_height: 0,
                    max_concurrent_blocks: 2000,
                    worker_pool_size: 3,
                },
                proof_mode: ProofMode::AnchoredOnly,
                features: FeatureFlags::default(),
                validators: Vec::new(),
            };

            let toml_str = toml::to_string_pretty(&cfg).context("serializing starter config")?;
            std::fs::write(&out, toml_str).with_context(|| format!("writing {}", out.display()))?;
            println!("wrote {}", out.display());
            Ok(())
        }
    }
}
