//! Configuration for the Datapolis API service.

use datapolis_auth_core::AuthConfig;
use std::time::Duration;

/// Default browser origin of the web client
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL; the in-memory store is used when unset
    pub database_url: Option<String>,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Per-request timeout, health routes excluded
    pub request_timeout: Duration,

    /// Origins allowed by CORS
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        // Server port
        let http_port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        // Request timeout (default 30 seconds)
        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECS"));
        }

        // CORS
        let cors_allowed_origins: Vec<String> = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
        if cors_allowed_origins.is_empty() {
            return Err(ConfigError::Invalid("CORS_ALLOWED_ORIGINS"));
        }

        let auth = AuthConfig::from_lookup(&lookup);

        Ok(Self {
            http_port,
            database_url,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
            cors_allowed_origins,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.http_port, 8080);
        assert!(config.database_url.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.cors_allowed_origins, [DEFAULT_CORS_ORIGIN]);
        assert!(config.auth.access_secret.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/datapolis"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("JWT_SECRET", "s1"),
            ("JWT_EXPIRES_IN", "30m"),
        ]))
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/datapolis"));
        assert_eq!(config.cors_allowed_origins, ["https://a.example", "https://b.example"]);
        assert_eq!(config.auth.access_secret.as_deref(), Some("s1"));
        assert_eq!(config.auth.access_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup(&[("PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::Invalid("PORT"))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Config::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))));
    }
}
