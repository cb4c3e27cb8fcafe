//! Repository traits
//!
//! Async credential store interface. Lookups return `Ok(None)` for absent
//! rows; only I/O failures surface as errors.

use async_trait::async_trait;
use datapolis_types::{Role, UserId};

use crate::error::DbResult;
use crate::models::UserRow;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: UserId) -> DbResult<Option<UserRow>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// All users, ordered by ID
    async fn list(&self) -> DbResult<Vec<UserRow>>;

    /// Create a new user
    ///
    /// Returns `DbError::Conflict` if the username or email is taken.
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Overwrite the mutable profile fields of a user
    ///
    /// Returns `DbError::NotFound` if the user is gone and
    /// `DbError::Conflict` if the new username or email is taken.
    async fn update(&self, id: UserId, update: UpdateUser) -> DbResult<UserRow>;

    /// Replace the stored password hash
    async fn update_password(&self, id: UserId, password_hash: &str) -> DbResult<()>;

    /// Connectivity check
    async fn ping(&self) -> DbResult<()>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Full set of mutable profile fields
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

impl UpdateUser {
    /// Start from the current state of a row
    pub fn from_row(row: &UserRow) -> Self {
        Self {
            username: row.username.clone(),
            email: row.email.clone(),
            role: row.role(),
            active: row.active,
        }
    }
}
