//! Auth service - login, refresh and bearer authentication

use datapolis_db::UserRepository;
use datapolis_types::TokenPair;
use std::sync::Arc;

use crate::{
    config::AuthConfig,
    password::PasswordHasher,
    permission::Actor,
    token::{TokenIssuer, TokenVerifier},
    AuthError,
};

/// Authentication service
///
/// Provides a unified interface for:
/// - Credential login (password check, token pair issuance)
/// - Access token renewal from a refresh token
/// - Resolving a bearer access token into an [`Actor`]
pub struct AuthService<U: UserRepository + ?Sized> {
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    hasher: PasswordHasher,
    user_repo: Arc<U>,
}

impl<U: UserRepository + ?Sized> AuthService<U> {
    /// Create a new auth service
    pub fn new(config: &AuthConfig, user_repo: Arc<U>) -> Self {
        Self {
            issuer: TokenIssuer::new(config),
            verifier: TokenVerifier::new(config),
            hasher: PasswordHasher::new(),
            user_repo,
        }
    }

    /// Replace the password hasher
    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Exchange a username and password for a token pair
    ///
    /// Unknown users, inactive users and wrong passwords all yield
    /// `InvalidCredentials`; the actual reason is only logged.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            // Same hashing cost as a mismatch, so timing does not reveal the username
            self.hasher.verify_dummy_blocking(password.to_string()).await;
            tracing::debug!(username, "Login failed: user not found");
            return Err(AuthError::InvalidCredentials);
        };

        let valid = self
            .hasher
            .verify_blocking(user.password_hash.clone(), password.to_string())
            .await;

        if !user.active {
            tracing::debug!(user_id = %user.user_id(), "Login failed: user inactive");
            return Err(AuthError::InvalidCredentials);
        }
        if !valid {
            tracing::debug!(user_id = %user.user_id(), "Login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issuer.issue_token_pair(&user.identity())?;
        tracing::info!(user_id = %user.user_id(), "User signed in");
        Ok(pair)
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Issue a new access token from a refresh token
    ///
    /// The refresh token is returned unchanged and `refresh_expires_in`
    /// is its remaining lifetime, so refreshing never extends a session.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verifier.verify_refresh_token(refresh_token)?;

        let user = self
            .user_repo
            .find_by_id(claims.user_id())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.active {
            tracing::debug!(user_id = %user.user_id(), "Refresh rejected: user inactive");
            return Err(AuthError::UserNotFound);
        }

        // Fresh identity from the store, so role changes apply on refresh
        let (access_token, expires_in) = self.issuer.issue_access_token(&user.identity())?;
        tracing::debug!(user_id = %user.user_id(), "Access token refreshed");

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in,
            refresh_expires_in: claims.remaining_secs(),
        })
    }

    // =========================================================================
    // Bearer authentication
    // =========================================================================

    /// Resolve an access token into the acting identity
    pub fn authenticate(&self, access_token: &str) -> Result<Actor, AuthError> {
        self.verifier.verify_access_token(access_token).map(Actor::from)
    }
}

impl<U: UserRepository + ?Sized> std::fmt::Debug for AuthService<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}
