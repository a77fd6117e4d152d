// Path: crates/crypto/src/sign/bls/mod.rs
//! BLS12-381 signature algorithm implementation using dcrypt.
//!
//! Signatures live in G1, public keys in G2, with hash-to-curve via
//! `Scalar::hash_to_field` under a fixed domain separation tag. Point
//! decompression (`from_compressed`) rejects points outside the
//! prime-order subgroup, which is what prevents rogue-key attacks during
//! aggregation: every public key and signature that enters this module has
//! already been subgroup-checked by the time it is usable.

use crate::error::CryptoError;
use crate::sign::traits::{SerializableKey, Signature, SigningKey, SigningKeyPair, VerifyingKey};
use dcrypt::algorithms::ec::bls12_381::{
    pairing, Bls12_381Scalar as Scalar, G1Affine, G1Projective, G2Affine, G2Projective,
};
use rand::rngs::OsRng;
use rand::RngCore;

/// Domain separation tag for hashing a message to a G1 point.
pub const BLS_DST: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";

/// A BLS12-381 key pair: secret scalar plus its G2 public key.
#[derive(Clone)]
pub struct BlsKeyPair {
    public_key: BlsPublicKey,
    secret_key: BlsPrivateKey,
}

/// A BLS12-381 public key, a point in G2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlsPublicKey(pub G2Affine);

/// A BLS12-381 private key, a scalar.
#[derive(Clone)]
pub struct BlsPrivateKey(pub Scalar);

/// A BLS12-381 signature, a point in G1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlsSignature(pub G1Affine);

impl BlsKeyPair {
    /// Generates a new key pair from OS randomness.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = OsRng;
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);

        let secret = Scalar::hash_to_field(&bytes, b"CERTEN-BLS-KEYGEN")
            .map_err(|e| CryptoError::OperationFailed(format!("keygen failed: {:?}", e)))?;

        let public = G2Affine::from(G2Projective::generator() * secret);

        Ok(Self {
            public_key: BlsPublicKey(public),
            secret_key: BlsPrivateKey(secret),
        })
    }

    /// Derives a key pair from a fixed 32-byte seed, for deterministic
    /// test fixtures and configured validator keys.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret = Scalar::hash_to_field(seed, b"CERTEN-BLS-KEYGEN")
            .map_err(|e| CryptoError::OperationFailed(format!("keygen failed: {:?}", e)))?;
        let public = G2Affine::from(G2Projective::generator() * secret);
        Ok(Self {
            public_key: BlsPublicKey(public),
            secret_key: BlsPrivateKey(secret),
        })
    }
}

impl SigningKeyPair for BlsKeyPair {
    type PublicKey = BlsPublicKey;
    type PrivateKey = BlsPrivateKey;
    type Signature = BlsSignature;

    fn public_key(&self) -> Self::PublicKey {
        self.public_key.clone()
    }

    fn private_key(&self) -> Self::PrivateKey {
        self.secret_key.clone()
    }

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        self.secret_key.sign(message)
    }
}

fn hash_to_g1(message: &[u8]) -> Result<G1Affine, CryptoError> {
    let msg_scalar = Scalar::hash_to_field(message, BLS_DST)
        .map_err(|e| CryptoError::OperationFailed(format!("hash to field failed: {:?}", e)))?;
    Ok(G1Affine::from(G1Projective::generator() * msg_scalar))
}

impl VerifyingKey for BlsPublicKey {
    type Signature = BlsSignature;

    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<(), CryptoError> {
        let msg_point = hash_to_g1(message)?;

        // e(sig, g2) == e(H(m), pk)
        let lhs = pairing(&signature.0, &G2Affine::generator());
        let rhs = pairing(&msg_point, &self.0);

        if lhs == rhs {
            Ok(())
        } else {
            Err(CryptoError::VerificationFailed)
        }
    }
}

impl SerializableKey for BlsPublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_compressed().as_ref().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 96 {
            return Err(CryptoError::InvalidLength {
                expected: 96,
                got: bytes.len(),
            });
        }
        let arr: [u8; 96] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidLength {
                expected: 96,
                got: bytes.len(),
            }
        })?;
        let point = G2Affine::from_compressed(&arr)
            .into_option()
            .ok_or(CryptoError::NotInSubgroup)?;
        Ok(Self(point))
    }
}

impl SigningKey for BlsPrivateKey {
    type Signature = BlsSignature;

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        let msg_point = hash_to_g1(message)?;
        let sig_proj = G1Projective::from(msg_point) * self.0;
        Ok(BlsSignature(G1Affine::from(sig_proj)))
    }
}

impl SerializableKey for BlsPrivateKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            });
        }
        let arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
            expected: 32,
            got: bytes.len(),
        })?;
        let scalar = Scalar::from_bytes(&arr)
            .into_option()
            .ok_or_else(|| CryptoError::InvalidKey("invalid scalar".into()))?;
        Ok(Self(scalar))
    }
}

impl SerializableKey for BlsSignature {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_compressed().as_ref().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 48 {
            return Err(CryptoError::InvalidLength {
                expected: 48,
                got: bytes.len(),
            });
        }
        let arr: [u8; 48] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
            expected: 48,
            got: bytes.len(),
        })?;
        let point = G1Affine::from_compressed(&arr)
            .into_option()
            .ok_or(CryptoError::NotInSubgroup)?;
        Ok(Self(point))
    }
}

impl Signature for BlsSignature {}

/// Aggregates signatures by summing their G1 points. Each input has already
/// passed subgroup validation via `BlsSignature::from_bytes`.
pub fn aggregate_signatures(signatures: &[BlsSignature]) -> Result<BlsSignature, CryptoError> {
    let mut acc = signatures
        .first()
        .map(|s| G1Projective::from(s.0))
        .ok_or(CryptoError::EmptyAggregate)?;
    for sig in &signatures[1..] {
        acc += G1Projective::from(sig.0);
    }
    Ok(BlsSignature(G1Affine::from(acc)))
}

/// Aggregates public keys by summing their G2 points.
pub fn aggregate_public_keys(keys: &[BlsPublicKey]) -> Result<BlsPublicKey, CryptoError> {
    let mut acc = keys
        .first()
        .map(|k| G2Projective::from(k.0))
        .ok_or(CryptoError::EmptyAggregate)?;
    for key in &keys[1..] {
        acc += G2Projective::from(key.0);
    }
    Ok(BlsPublicKey(G2Affine::from(acc)))
}

/// Verifies an aggregate signature against the sum of the given public
/// keys, all signing the same message. This is only sound when every
/// signer actually signed `message` under the same domain; callers must
/// not mix domains.
pub fn verify_aggregate(
    public_keys: &[BlsPublicKey],
    message: &[u8],
    aggregate: &BlsSignature,
) -> Result<(), CryptoError> {
    let combined = aggregate_public_keys(public_keys)?;
    combined.verify(message, aggregate)
}

/// Evaluates the 2/3 voting-power threshold: `3*signed >= 2*total`.
pub fn threshold_met(signed_voting_power: u128, total_voting_power: u128) -> bool {
    3u128.saturating_mul(signed_voting_power) >= 2u128.saturating_mul(total_voting_power)
}
