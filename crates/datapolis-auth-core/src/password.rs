//! Password hashing and verification
//!
//! Argon2id with a random per-password salt, stored in PHC string format.
//! Hashing is CPU-bound; the async wrappers move it onto the blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use std::sync::{Arc, OnceLock};

use crate::AuthError;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Check a candidate password against the policy
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

/// Input for the throwaway hash burned on logins without a stored hash
const DUMMY_PASSWORD: &str = "datapolis-dummy-password";

/// Salted one-way password hasher
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of `DUMMY_PASSWORD` under this hasher's parameters
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Hasher with the library's recommended Argon2id parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: Arc::default(),
        }
    }

    /// Hash a plaintext password
    pub fn hash(&self, plain: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                AuthError::Internal("failed to hash password".to_string())
            })
    }

    /// Verify a plaintext password against a stored hash
    ///
    /// Returns `false` on mismatch and on a malformed stored hash.
    pub fn verify(&self, hash: &str, plain: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_blocking(&self, plain: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| {
                tracing::error!("Password hashing task failed: {}", e);
                AuthError::Internal("failed to hash password".to_string())
            })?
    }

    /// [`verify`](Self::verify) on the blocking thread pool
    pub async fn verify_blocking(&self, hash: String, plain: String) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &plain))
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Password verification task failed: {}", e);
                false
            })
    }

    fn dummy_hash(&self) -> &str {
        self.dummy_hash
            .get_or_init(|| self.hash(DUMMY_PASSWORD).unwrap_or_default())
    }

    /// Run one full verification against a throwaway hash
    ///
    /// Paths with no stored hash to check call this so they cost the
    /// same as a password mismatch.
    pub async fn verify_dummy_blocking(&self, plain: String) {
        let hasher = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            let hash = hasher.dummy_hash();
            hasher.verify(hash, &plain)
        })
        .await;

        if let Err(e) = result {
            tracing::error!("Password verification task failed: {}", e);
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::with_params(Params::new(8, 1, 1, None).unwrap())
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "correct horse"));
        assert!(!hasher.verify(&hash, "battery staple"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = cheap_hasher();
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify(&a, "same-password"));
        assert!(hasher.verify(&b, "same-password"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let hasher = cheap_hasher();
        assert!(!hasher.verify("", "anything"));
        assert!(!hasher.verify("plaintext-password", "plaintext-password"));
        assert!(!hasher.verify("$2a$10$bcryptlookingvalue", "x"));
    }

    #[test]
    fn test_verify_uses_params_from_hash() {
        let hash = cheap_hasher().hash("secret1").unwrap();
        assert!(PasswordHasher::new().verify(&hash, "secret1"));
    }

    #[test]
    fn test_password_policy_boundary() {
        assert!(matches!(validate_password("12345"), Err(AuthError::WeakPassword)));
        assert!(validate_password("123456").is_ok());
        assert!(matches!(validate_password(""), Err(AuthError::WeakPassword)));
        // Counted in characters, not bytes
        assert!(matches!(validate_password(&"пароль"[..10]), Err(AuthError::WeakPassword)));
        assert!(validate_password("пароль").is_ok());
    }

    #[tokio::test]
    async fn test_dummy_hash_is_reused_and_never_matches_input() {
        let hasher = cheap_hasher();
        hasher.verify_dummy_blocking("alice-password".to_string()).await;

        let first = hasher.dummy_hash().to_string();
        assert!(first.starts_with("$argon2id$"));
        assert!(!hasher.verify(&first, "alice-password"));

        // Shared across clones, computed once
        assert_eq!(hasher.clone().dummy_hash(), first);
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hasher = cheap_hasher();
        let hash = hasher.hash_blocking("s3cret!".to_string()).await.unwrap();
        assert!(hasher.verify_blocking(hash.clone(), "s3cret!".to_string()).await);
        assert!(!hasher.verify_blocking(hash, "wrong".to_string()).await);
    }
}
