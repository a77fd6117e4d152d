// Path: crates/cli/src/commands/verify.rs
//! The `verify <account_url>` subcommand: builds a one-shot chained proof
//! and G0 governance proof for a transaction, and reports per-layer
//! pass/fail.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use certen_clients::consensus::HttpConsensusClient;
use certen_clients::source_ledger::HttpSourceLedgerClient;
use certen_proof::{ChainedProofBuilder, GovernanceProofBuilder};
use certen_types::hash::Hash32;

use crate::util::{load_config, ExitCode};

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// The source-ledger account URL to verify a transaction for.
    pub account_url: String,
    /// The transaction hash to verify, hex-encoded.
    #[clap(long)]
    pub tx_hash: String,
    /// Path to the validator's TOML config file.
    #[clap(long, default_value = "validator.toml")]
    pub config: PathBuf,
    /// The partition chain name the transaction was discovered on.
    #[clap(long, default_value = "bvn1")]
    pub chain_name: String,
}

/// One hop's pass/fail outcome in a verification report.
#[derive(Debug, Serialize)]
pub struct HopResult {
    /// The hop name: `l1`, `l2`, `l3`, or `g0`.
    pub hop: String,
    /// Whether the hop passed its structural/stitching check.
    pub passed: bool,
    /// A short human-readable detail, set when `passed` is false.
    pub detail: Option<String>,
}

/// The structured verification report: per-layer pass/fail and, if any
/// layer failed, the name of the first one that did.
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    /// The account URL verified.
    pub account_url: String,
    /// The transaction hash verified.
    pub tx_hash: String,
    /// One entry per hop attempted, in order.
    pub hops: Vec<HopResult>,
    /// The derived trust level, if the chained proof built at all.
    pub trust_level: Option<String>,
    /// The name of the first failing hop, if any.
    pub failing_hop: Option<String>,
}

pub async fn run(args: VerifyArgs) -> Result<ExitCode> {
    let config = load_config(&args.config)?;
    let tx_hash = Hash32::from_hex(&args.tx_hash).context("parsing --tx-hash")?;

    let source = Arc::new(HttpSourceLedgerClient::new(config.endpoints.source_endpoint.clone()));
    let consensus = Arc::new(HttpConsensusClient::new(config.endpoints.consensus_endpoint.clone()));
    let builder = ChainedProofBuilder::new(source, consensus, args.chain_name.clone(), config.proof_mode);

    let mut hops = Vec::new();
    let mut failing_hop = None;
    let mut trust_level = None;

    let l1 = match builder
        .build_l1(&args.account_url, tx_hash, &args.chain_name, 0, &args.chain_name)
        .await
    {
        Ok(l1) => {
            hops.push(HopResult { hop: "l1".into(), passed: l1.validate(), detail: None });
            if !l1.validate() && failing_hop.is_none() {
                failing_hop = Some("l1".to_string());
            }
            Some(l1)
        }
        Err(e) => {
            hops.push(HopResult { hop: "l1".into(), passed: false, detail: Some(e.to_string()) });
            failing_hop = Some("l1".to_string());
            None
        }
    };

    let l2 = if let Some(l1) = l1.as_ref() {
        match builder.build_l2(l1).await {
            Ok(l2) => {
                let passed = l2.validate(l1);
                hops.push(HopResult { hop: "l2".into(), passed, detail: None });
                if !passed && failing_hop.is_none() {
                    failing_hop = Some("l2".to_string());
                }
                Some(l2)
            }
            Err(e) => {
                hops.push(HopResult { hop: "l2".into(), passed: false, detail: Some(e.to_string()) });
                if failing_hop.is_none() {
                    failing_hop = Some("l2".to_string());
                }
                None
            }
        }
    } else {
        None
    };

    if let Some(l2) = l2.as_ref() {
        match builder.build_l3(&args.chain_name, l2).await {
            Ok(l3) => {
                let passed = l3.is_fully_verified();
                hops.push(HopResult { hop: "l3".into(), passed, detail: None });
                if !passed && failing_hop.is_none() {
                    failing_hop = Some("l3".to_string());
                }
            }
            Err(e) => {
                hops.push(HopResult { hop: "l3".into(), passed: false, detail: Some(e.to_string()) });
                if failing_hop.is_none() {
                    failing_hop = Some("l3".to_string());
                }
            }
        }
    }

    if let Some(l1) = l1.as_ref() {
        let g0 = GovernanceProofBuilder::build_g0(l1, tx_hash, &args.account_url);
        hops.push(HopResult { hop: "g0".into(), passed: g0.g0_complete, detail: None });
        if !g0.g0_complete && failing_hop.is_none() {
            failing_hop = Some("g0".to_string());
        }
    }

    if let Ok(chained) = builder
        .build(&args.account_url, tx_hash, &args.chain_name, 0, &args.chain_name)
        .await
    {
        trust_level = Some(format!("{:?}", chained.trust_level));
    }

    let report = VerifyReport {
        account_url: args.account_url,
        tx_hash: args.tx_hash,
        hops,
        trust_level,
        failing_hop: failing_hop.clone(),
    };

    println!("{}", serde_json::to_string_pretty(&report).context("serializing verify report")?);

    Ok(if failing_hop.is_some() { ExitCode::Runtime } else { ExitCode::Success })
}
