//! Configuration types for the auth core

use std::time::Duration;

/// Access token lifetime when none is configured (15 minutes)
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Refresh token lifetime when none is configured (7 days)
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Token signing configuration
///
/// Secrets are optional here: a missing secret is reported by the token
/// issuer/verifier the first time it is needed, as `AuthError::Configuration`.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub access_secret: Option<String>,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// HMAC secret for refresh tokens (distinct signing domain)
    pub refresh_secret: Option<String>,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl AuthConfig {
    /// Create a config with both secrets and default lifetimes
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: non_empty(access_secret.into()),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_secret: non_empty(refresh_secret.into()),
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }

    /// Load from `JWT_SECRET`, `JWT_EXPIRES_IN`, `REFRESH_TOKEN_SECRET`
    /// and `REFRESH_TOKEN_EXPIRES_IN`.
    ///
    /// Lifetimes are human durations (`15m`, `168h`). Missing or
    /// unparsable lifetimes fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (used by `from_env` and tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            access_secret: lookup("JWT_SECRET").and_then(non_empty),
            access_ttl: parse_ttl("JWT_EXPIRES_IN", lookup("JWT_EXPIRES_IN"), DEFAULT_ACCESS_TTL),
            refresh_secret: lookup("REFRESH_TOKEN_SECRET").and_then(non_empty),
            refresh_ttl: parse_ttl(
                "REFRESH_TOKEN_EXPIRES_IN",
                lookup("REFRESH_TOKEN_EXPIRES_IN"),
                DEFAULT_REFRESH_TTL,
            ),
        }
    }

    /// Set access token lifetime
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Set refresh token lifetime
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: None,
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_secret: None,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret_set", &self.access_secret.is_some())
            .field("access_ttl", &self.access_ttl)
            .field("refresh_secret_set", &self.refresh_secret.is_some())
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn parse_ttl(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return default;
    };

    match humantime::parse_duration(raw.trim()) {
        Ok(ttl) if !ttl.is_zero() => ttl,
        Ok(_) | Err(_) => {
            tracing::warn!(key, value = %raw, default = ?default, "Unparsable token lifetime, using default");
            default
        }
    }
}
