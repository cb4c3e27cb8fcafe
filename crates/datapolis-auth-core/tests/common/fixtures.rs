//! Seeded stores and services

use argon2::Params;
use async_trait::async_trait;
use datapolis_auth_core::{AuthConfig, AuthService, PasswordHasher, UserService};
use datapolis_db::{
    CreateUser, DbError, DbResult, MemoryUserRepository, UpdateUser, UserRepository, UserRow,
};
use datapolis_types::{Role, UserId};
use std::sync::Arc;

pub const ACCESS_SECRET: &str = "integration-access-secret";
pub const REFRESH_SECRET: &str = "integration-refresh-secret";

pub const ALICE_PASSWORD: &str = "alice-password";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const CAROL_PASSWORD: &str = "carol-password";

/// Default TTLs, fixed secrets
pub fn test_config() -> AuthConfig {
    AuthConfig::new(ACCESS_SECRET, REFRESH_SECRET)
}

/// Argon2id with minimal cost so tests stay fast
pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::with_params(Params::new(8, 1, 1, None).unwrap())
}

/// Store seeded with alice (1, user), admin (2, admin), carol (3, user)
pub async fn seeded_repo() -> Arc<MemoryUserRepository> {
    let repo = Arc::new(MemoryUserRepository::new());
    let hasher = cheap_hasher();

    for (username, password, role) in [
        ("alice", ALICE_PASSWORD, Role::User),
        ("admin", ADMIN_PASSWORD, Role::Admin),
        ("carol", CAROL_PASSWORD, Role::User),
    ] {
        repo.create(CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hasher.hash(password).unwrap(),
            role,
        })
        .await
        .unwrap();
    }

    repo
}

pub fn auth_service<U: UserRepository + ?Sized>(repo: Arc<U>) -> AuthService<U> {
    AuthService::new(&test_config(), repo).with_password_hasher(cheap_hasher())
}

pub fn user_service<U: UserRepository + ?Sized>(repo: Arc<U>) -> UserService<U> {
    UserService::new(repo).with_password_hasher(cheap_hasher())
}

/// Store whose every call fails with a driver error
#[derive(Debug, Default)]
pub struct FailingUserRepository;

fn driver_error<T>() -> DbResult<T> {
    Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn find_by_id(&self, _id: UserId) -> DbResult<Option<UserRow>> {
        driver_error()
    }

    async fn find_by_username(&self, _username: &str) -> DbResult<Option<UserRow>> {
        driver_error()
    }

    async fn find_by_email(&self, _email: &str) -> DbResult<Option<UserRow>> {
        driver_error()
    }

    async fn list(&self) -> DbResult<Vec<UserRow>> {
        driver_error()
    }

    async fn create(&self, _user: CreateUser) -> DbResult<UserRow> {
        driver_error()
    }

    async fn update(&self, _id: UserId, _update: UpdateUser) -> DbResult<UserRow> {
        driver_error()
    }

    async fn update_password(&self, _id: UserId, _password_hash: &str) -> DbResult<()> {
        driver_error()
    }

    async fn ping(&self) -> DbResult<()> {
        driver_error()
    }
}
