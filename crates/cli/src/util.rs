// Path: crates/cli/src/util.rs
//! Config loading and key-reference resolution shared by every subcommand.

use anyhow::{bail, Context, Result};
use certen_crypto::sign::bls::BlsKeyPair;
use certen_crypto::sign::eddsa::Ed25519KeyPair;
use certen_crypto::sign::traits::SerializableKey;
use certen_types::config::ValidatorConfig;

/// Process exit codes, per the CLI's documented contract: 0 success, 1
/// configuration error, 2 runtime error, 3 internal invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Config = 1,
    Runtime = 2,
    Invariant = 3,
}

/// Loads and validates a [`ValidatorConfig`] from a TOML file.
pub fn load_config(path: &std::path::Path) -> Result<ValidatorConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let cfg: ValidatorConfig = toml::from_str(&raw)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    cfg.validate().map_err(anyhow::Error::msg)?;
    Ok(cfg)
}

/// Resolves a key reference of the form `env:VAR_NAME` (a 32-byte hex seed
/// read from the named environment variable) or `hex:<64 hex chars>` (an
/// inline seed, accepted for local devnets only). No other scheme is
/// supported; raw key material never lives directly in the config file.
fn resolve_seed(key_ref: &str) -> Result<[u8; 32]> {
    let hex_str = if let Some(var) = key_ref.strip_prefix("env:") {
        std::env::var(var).with_context(|| format!("reading env var {var} for key material"))?
    } else if let Some(inline) = key_ref.strip_prefix("hex:") {
        inline.to_string()
    } else {
        bail!("unsupported key reference scheme: {key_ref} (expected env:NAME or hex:...)");
    };
    let bytes = hex::decode(hex_str.trim()).context("decoding key seed hex")?;
    if bytes.len() != 32 {
        bail!("key seed must be exactly 32 bytes, got {}", bytes.len());
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes);
    Ok(seed)
}

/// Resolves the validator's Ed25519 signing key from its config reference.
pub fn resolve_ed25519_key(key_ref: &str) -> Result<Ed25519KeyPair> {
    let seed = resolve_seed(key_ref)?;
    Ed25519KeyPair::from_seed(&seed).map_err(|e| anyhow::anyhow!("deriving ed25519 key: {e}"))
}

/// Resolves the validator's BLS12-381 signing key from its config reference.
pub fn resolve_bls_key(key_ref: &str) -> Result<BlsKeyPair> {
    let seed = resolve_seed(key_ref)?;
    BlsKeyPair::from_seed(&seed).map_err(|e| anyhow::anyhow!("deriving bls key: {e}"))
}

/// Parses a hex-encoded, compressed BLS public key from a peer validator
/// config entry.
pub fn parse_bls_public_key_hex(hex_str: &str) -> Result<certen_crypto::sign::bls::BlsPublicKey> {
    let bytes = hex::decode(hex_str).context("decoding peer BLS public key hex")?;
    certen_crypto::sign::bls::BlsPublicKey::from_bytes(&bytes)
        .map_err(|e| anyhow::anyhow!("parsing peer BLS public key: {e}"))
}
