//! Application state

use std::sync::Arc;

use datapolis_auth_core::{AuthService, PasswordHasher, UserService};
use datapolis_db::UserRepository;

use crate::config::Config;

/// Auth service over whichever store the process was started with
pub type AuthServiceImpl = AuthService<dyn UserRepository>;

/// User service over whichever store the process was started with
pub type UserServiceImpl = UserService<dyn UserRepository>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Login, refresh and bearer authentication
    pub auth: Arc<AuthServiceImpl>,
    /// Registration and guarded profile updates
    pub users: Arc<UserServiceImpl>,
    /// Credential store (shared reference for readiness checks)
    pub repo: Arc<dyn UserRepository>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(repo: Arc<dyn UserRepository>, config: Config, hasher: PasswordHasher) -> Self {
        let auth = AuthService::new(&config.auth, Arc::clone(&repo))
            .with_password_hasher(hasher.clone());
        let users = UserService::new(Arc::clone(&repo)).with_password_hasher(hasher);

        Self {
            auth: Arc::new(auth),
            users: Arc::new(users),
            repo,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}
