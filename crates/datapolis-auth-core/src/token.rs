//! Access/refresh token issuance and verification
//!
//! Tokens are compact HS256 JWTs. Access and refresh tokens are signed with
//! distinct secrets, so a leaked key for one class cannot mint the other.

use base64::{engine::general_purpose::URL_SAFE, Engine};
use chrono::Utc;
use datapolis_types::{Identity, Role, TokenPair, UserId};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{AuthConfig, AuthError};

/// Size of the random refresh token identifier (128 bits)
pub const TOKEN_ID_BYTES: usize = 16;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    /// Unique token identifier, base64 of 16 random bytes
    pub jti: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

impl AccessClaims {
    /// Get the user ID
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

impl RefreshClaims {
    /// Get the user ID
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Seconds until expiry, never negative
    pub fn remaining_secs(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// Token class, used to pick the key and for log context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn secret_var(self) -> &'static str {
        match self {
            Self::Access => "JWT_SECRET",
            Self::Refresh => "REFRESH_TOKEN_SECRET",
        }
    }
}

fn missing_secret(kind: TokenKind) -> AuthError {
    tracing::error!(secret = kind.secret_var(), "Token secret is not configured");
    AuthError::Configuration(format!("{} is not set", kind.secret_var()))
}

fn ttl_secs(ttl: std::time::Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

/// Generate a random refresh token identifier
fn generate_token_id() -> Result<String, AuthError> {
    let mut bytes = [0u8; TOKEN_ID_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::error!("Failed to read OS entropy: {}", e);
        AuthError::Internal("failed to generate token id".to_string())
    })?;
    Ok(URL_SAFE.encode(bytes))
}

fn sign<T: Serialize>(claims: &T, key: &EncodingKey) -> Result<String, AuthError> {
    encode(&Header::new(Algorithm::HS256), claims, key).map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        AuthError::Internal("failed to sign token".to_string())
    })
}

/// Creates signed, time-bounded tokens bound to an identity
#[derive(Clone)]
pub struct TokenIssuer {
    access_key: Option<EncodingKey>,
    access_ttl: i64,
    refresh_key: Option<EncodingKey>,
    refresh_ttl: i64,
}

impl TokenIssuer {
    /// Create an issuer from config
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: config
                .access_secret
                .as_deref()
                .map(|s| EncodingKey::from_secret(s.as_bytes())),
            access_ttl: ttl_secs(config.access_ttl),
            refresh_key: config
                .refresh_secret
                .as_deref()
                .map(|s| EncodingKey::from_secret(s.as_bytes())),
            refresh_ttl: ttl_secs(config.refresh_ttl),
        }
    }

    /// Issue an access token; returns the token and its lifetime in seconds
    pub fn issue_access_token(&self, identity: &Identity) -> Result<(String, i64), AuthError> {
        let key = self
            .access_key
            .as_ref()
            .ok_or_else(|| missing_secret(TokenKind::Access))?;

        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            user_id: identity.id.0,
            username: identity.username.clone(),
            role: identity.role,
            iat: now,
            exp: now.saturating_add(self.access_ttl),
        };

        Ok((sign(&claims, key)?, self.access_ttl))
    }

    /// Issue a refresh token; returns the token and its lifetime in seconds
    pub fn issue_refresh_token(&self, identity: &Identity) -> Result<(String, i64), AuthError> {
        let key = self
            .refresh_key
            .as_ref()
            .ok_or_else(|| missing_secret(TokenKind::Refresh))?;

        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            user_id: identity.id.0,
            username: identity.username.clone(),
            role: identity.role,
            jti: generate_token_id()?,
            iat: now,
            exp: now.saturating_add(self.refresh_ttl),
        };

        Ok((sign(&claims, key)?, self.refresh_ttl))
    }

    /// Issue an access and a refresh token for the same identity
    pub fn issue_token_pair(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let (access_token, expires_in) = self.issue_access_token(identity)?;
        let (refresh_token, refresh_expires_in) = self.issue_refresh_token(identity)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in,
            refresh_expires_in,
        })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// Validates presented tokens and recovers their claims
///
/// Verification is signature-first: claims are only deserialized and
/// checked for expiry after the MAC matches. `TokenExpired` therefore
/// always means "genuine but stale", never "forged".
#[derive(Clone)]
pub struct TokenVerifier {
    access_key: Option<DecodingKey>,
    refresh_key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from config
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            access_key: config
                .access_secret
                .as_deref()
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            refresh_key: config
                .refresh_secret
                .as_deref()
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let key = self
            .access_key
            .as_ref()
            .ok_or_else(|| missing_secret(TokenKind::Access))?;
        let claims: AccessClaims = self.verify(token, key, TokenKind::Access)?;

        // Double check, jsonwebtoken should catch this
        if claims.is_expired() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    /// Verify a refresh token and return its claims
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let key = self
            .refresh_key
            .as_ref()
            .ok_or_else(|| missing_secret(TokenKind::Refresh))?;
        let claims: RefreshClaims = self.verify(token, key, TokenKind::Refresh)?;

        if claims.is_expired() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    fn verify<T: DeserializeOwned>(
        &self,
        token: &str,
        key: &DecodingKey,
        kind: TokenKind,
    ) -> Result<T, AuthError> {
        decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!(?kind, "Token expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::debug!(?kind, "Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("access_key_set", &self.access_key.is_some())
            .field("refresh_key_set", &self.refresh_key.is_some())
            .finish_non_exhaustive()
    }
}
