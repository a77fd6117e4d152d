// Path: crates/crypto/src/error.rs
//! Local error type for the `certen-crypto` crate.

use thiserror::Error;

/// Errors from cryptographic operations: key parsing, signing, verification,
/// and aggregation.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The signature failed cryptographic verification.
    #[error("signature verification failed")]
    VerificationFailed,
    /// The provided key material is malformed or invalid for the algorithm.
    #[error("invalid cryptographic key: {0}")]
    InvalidKey(String),
    /// The provided signature material is malformed or invalid.
    #[error("invalid signature format: {0}")]
    InvalidSignature(String),
    /// A hash or key had an unexpected byte length.
    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
    /// A generic failure in an underlying cryptographic library.
    #[error("cryptographic operation failed: {0}")]
    OperationFailed(String),
    /// A BLS public key or signature did not lie in the prime-order
    /// subgroup, which would otherwise enable a rogue-key attack.
    #[error("point is not in the prime-order subgroup")]
    NotInSubgroup,
    /// Aggregation was attempted over an empty input set.
    #[error("cannot aggregate an empty set of signatures or keys")]
    EmptyAggregate,
}

impl From<dcrypt::Error> for CryptoError {
    fn from(e: dcrypt::Error) -> Self {
        CryptoError::OperationFailed(e.to_string())
    }
}
