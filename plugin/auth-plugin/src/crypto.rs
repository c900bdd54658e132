//! Cryptographic primitives
//!
//! The three operations the credential and token code needs, behind one
//! trait so tests can swap in deterministic implementations.

use crate::error::AuthError;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

/// Derived key length in bytes
pub const KEY_LEN: usize = 32;

pub trait CryptoPrimitives: Send + Sync {
    /// PBKDF2-style key derivation. Must be deterministic.
    fn derive_key(&self, password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN];

    /// Fill `buf` with unpredictable bytes
    fn random_bytes(&self, buf: &mut [u8]);

    /// Sign a JSON claim object with an HMAC-SHA256 key and return the compact token
    fn sign_and_encode(
        &self,
        claims: &serde_json::Map<String, serde_json::Value>,
        secret: &[u8],
    ) -> Result<String, AuthError>;
}

/// PBKDF2-HMAC-SHA256, the OS RNG and HS256 JWTs
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCrypto;

impl CryptoPrimitives for DefaultCrypto {
    fn derive_key(&self, password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
        key
    }

    fn random_bytes(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }

    fn sign_and_encode(
        &self,
        claims: &serde_json::Map<String, serde_json::Value>,
        secret: &[u8],
    ) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| {
            tracing::error!("Token signing failed: {:?}", e);
            AuthError::Internal
        })
    }
}

/// Constant-time byte comparison to prevent timing attacks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
