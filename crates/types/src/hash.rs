// Path: crates/types/src/hash.rs
//! The fixed 32-byte hash newtype used throughout the proof pipeline.
//!
//! Every hash in this system — receipt `start`/`anchor`/entry hashes,
//! operation ids, commitments, bundle ids — is exactly 32 bytes. Hex
//! encodings are always lower-case; decoding refuses any other length or
//! casing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::IntegrityError;

/// A 32-byte hash with strict length and lower-case hex discipline.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// The all-zero hash, used as a sentinel for "not yet computed".
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// Wraps a byte slice, enforcing exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IntegrityError> {
        if bytes.len() != 32 {
            return Err(IntegrityError::LengthDiscipline {
                expected: 32,
                got: bytes.len(),
            });
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Parses a lower-case hex string (with or without a `0x` prefix) into a hash.
    ///
    /// Rejects upper-case hex and any length other than 64 hex characters,
    /// per the codec's refusal of non-canonical encodings.
    pub fn from_hex(s: &str) -> Result<Self, IntegrityError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 64 {
            return Err(IntegrityError::LengthDiscipline {
                expected: 32,
                got: s.len() / 2,
            });
        }
        if s.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(IntegrityError::NonCanonicalHex(s.to_string()));
        }
        let bytes = hex::decode(s).map_err(|e| IntegrityError::NonCanonicalHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Renders the hash as lower-case hex, no `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Borrows the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<String> for Hash32 {
    type Error = IntegrityError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Hash32> for String {
    fn from(value: Hash32) -> Self {
        value.to_hex()
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        assert!(Hash32::from_slice(&[0u8; 31]).is_err());
        assert!(Hash32::from_slice(&[0u8; 33]).is_err());
        assert!(Hash32::from_slice(&[0u8; 32]).is_ok());
    }

    #[test]
    fn rejects_upper_case_hex() {
        let lower = "a".repeat(64);
        let upper = "A".repeat(64);
        assert!(Hash32::from_hex(&lower).is_ok());
        assert!(Hash32::from_hex(&upper).is_err());
    }

    #[test]
    fn hex_roundtrip() {
        let h = Hash32([7u8; 32]);
        let s = h.to_hex();
        assert_eq!(Hash32::from_hex(&s).unwrap(), h);
    }
}
