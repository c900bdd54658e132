//! Password Credentials
//!
//! Salted PBKDF2-HMAC-SHA256 hashing. A stored credential is two base64
//! strings: the salt on its own, and `salt || derived key` packed together.

use crate::crypto::{constant_time_eq, CryptoPrimitives, KEY_LEN};
use crate::error::AuthError;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

pub const SALT_LEN: usize = 16;
const PACKED_LEN: usize = SALT_LEN + KEY_LEN;

/// Encoded credential material ready for the user store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    pub password_hash: String,
    pub password_salt: String,
}

/// Derives and verifies password hashes
#[derive(Clone)]
pub struct CredentialManager {
    crypto: Arc<dyn CryptoPrimitives>,
    iterations: u32,
}

impl CredentialManager {
    pub fn new(crypto: Arc<dyn CryptoPrimitives>, iterations: u32) -> Self {
        Self { crypto, iterations }
    }

    /// Fresh random salt
    pub fn generate_salt(&self) -> [u8; SALT_LEN] {
        let mut salt = [0u8; SALT_LEN];
        self.crypto.random_bytes(&mut salt);
        salt
    }

    pub fn derive_hash(&self, password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
        self.crypto
            .derive_key(password.as_bytes(), salt, self.iterations)
    }

    /// Re-derive with `salt` and compare against `stored_hash`
    pub fn verify(&self, password: &str, salt: &[u8], stored_hash: &[u8]) -> bool {
        let derived = self.derive_hash(password, salt);
        constant_time_eq(&derived, stored_hash)
    }

    /// Hash a password with a new salt
    pub fn hash_password(&self, password: &str) -> PasswordCredential {
        let salt = self.generate_salt();
        let key = self.derive_hash(password, &salt);

        let mut packed = [0u8; PACKED_LEN];
        packed[..SALT_LEN].copy_from_slice(&salt);
        packed[SALT_LEN..].copy_from_slice(&key);

        PasswordCredential {
            password_hash: STANDARD.encode(packed),
            password_salt: STANDARD.encode(salt),
        }
    }

    /// Verify a password against the two stored columns.
    ///
    /// Returns `Err` only when the stored material itself is unusable.
    pub fn verify_stored(
        &self,
        password: &str,
        password_hash: &str,
        password_salt: &str,
    ) -> Result<bool, AuthError> {
        let salt = STANDARD.decode(password_salt)?;
        let packed = STANDARD.decode(password_hash)?;

        if salt.len() != SALT_LEN || packed.len() != PACKED_LEN {
            tracing::error!(
                salt_len = salt.len(),
                hash_len = packed.len(),
                "Stored credential has unexpected length"
            );
            return Err(AuthError::Internal);
        }

        let mut expected = [0u8; PACKED_LEN];
        expected[..SALT_LEN].copy_from_slice(&salt);
        expected[SALT_LEN..].copy_from_slice(&self.derive_hash(password, &salt));

        Ok(constant_time_eq(&expected, &packed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCrypto;
    use std::collections::HashSet;

    fn manager() -> CredentialManager {
        CredentialManager::new(Arc::new(DefaultCrypto), 10_000)
    }

    #[test]
    fn test_verify_accepts_derived_hash() {
        let credentials = manager();
        for password in ["P@ssw0rd123", "", "pässwörd", "a much longer passphrase with spaces"] {
            let salt = credentials.generate_salt();
            let hash = credentials.derive_hash(password, &salt);
            assert!(credentials.verify(password, &salt, &hash));
        }
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let credentials = manager();
        let salt = credentials.generate_salt();
        let hash = credentials.derive_hash("P@ssw0rd123", &salt);

        assert!(!credentials.verify("P@ssw0rd124", &salt, &hash));
        assert!(!credentials.verify("P@ssw0rd123", &salt, &hash[..31]));
    }

    #[test]
    fn test_different_salts_give_different_hashes() {
        let credentials = manager();
        let a = credentials.derive_hash("P@ssw0rd123", &[1u8; SALT_LEN]);
        let b = credentials.derive_hash("P@ssw0rd123", &[2u8; SALT_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_salts_are_unique() {
        let credentials = manager();
        let salts: HashSet<[u8; SALT_LEN]> = (0..256).map(|_| credentials.generate_salt()).collect();
        assert_eq!(salts.len(), 256);
    }

    #[test]
    fn test_stored_credential_layout() {
        let credentials = manager();
        let stored = credentials.hash_password("P@ssw0rd123");

        let packed = STANDARD.decode(&stored.password_hash).unwrap();
        let salt = STANDARD.decode(&stored.password_salt).unwrap();

        assert_eq!(packed.len(), 48);
        assert_eq!(&packed[..16], salt.as_slice());
        assert_eq!(&packed[16..], &credentials.derive_hash("P@ssw0rd123", &salt));
    }

    #[test]
    fn test_verify_stored() {
        let credentials = manager();
        let stored = credentials.hash_password("P@ssw0rd123");

        assert_eq!(
            credentials.verify_stored("P@ssw0rd123", &stored.password_hash, &stored.password_salt),
            Ok(true)
        );
        assert_eq!(
            credentials.verify_stored("wrong", &stored.password_hash, &stored.password_salt),
            Ok(false)
        );
    }

    #[test]
    fn test_verify_stored_uses_the_stored_salt() {
        let credentials = manager();
        let stored = credentials.hash_password("P@ssw0rd123");
        let other = credentials.hash_password("P@ssw0rd123");

        assert_ne!(stored.password_hash, other.password_hash);
        assert_eq!(
            credentials.verify_stored("P@ssw0rd123", &stored.password_hash, &other.password_salt),
            Ok(false)
        );
    }

    #[test]
    fn test_corrupt_stored_credential_is_an_error() {
        let credentials = manager();
        let stored = credentials.hash_password("P@ssw0rd123");

        assert_eq!(
            credentials.verify_stored("P@ssw0rd123", "not base64!", &stored.password_salt),
            Err(AuthError::Internal)
        );
        assert_eq!(
            credentials.verify_stored("P@ssw0rd123", &stored.password_salt, &stored.password_salt),
            Err(AuthError::Internal)
        );
    }
}
