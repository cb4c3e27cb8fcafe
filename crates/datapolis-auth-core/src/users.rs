//! User management - registration, profile reads and guarded updates

use datapolis_db::{CreateUser, UpdateUser, UserRepository};
use datapolis_types::{Role, UserId, UserProfile};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    password::{validate_password, PasswordHasher},
    permission::{authorize_deactivation, authorize_role_change, ensure_can_update, Actor},
    AuthError,
};

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Partial profile update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UserChanges {
    /// Overlay the changes on the current state
    pub fn apply_to(self, mut current: UpdateUser) -> UpdateUser {
        if let Some(username) = self.username {
            current.username = username;
        }
        if let Some(email) = self.email {
            current.email = email;
        }
        if let Some(role) = self.role {
            current.role = role;
        }
        if let Some(active) = self.active {
            current.active = active;
        }
        current
    }
}

/// Reject a blank username or an email without `local@domain` shape
///
/// Shared by registration and profile updates.
pub fn validate_profile(username: &str, email: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::InvalidInput("username must not be empty".to_string()));
    }
    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidInput("email must be a valid address".to_string())),
    }
}

/// User management service
pub struct UserService<U: UserRepository + ?Sized> {
    hasher: PasswordHasher,
    user_repo: Arc<U>,
}

impl<U: UserRepository + ?Sized> UserService<U> {
    pub fn new(user_repo: Arc<U>) -> Self {
        Self {
            hasher: PasswordHasher::new(),
            user_repo,
        }
    }

    /// Replace the password hasher
    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Create a new user; role defaults to `user`
    pub async fn register(&self, new_user: NewUser) -> Result<UserProfile, AuthError> {
        validate_profile(&new_user.username, &new_user.email)?;
        validate_password(&new_user.password)?;

        if self.user_repo.find_by_username(&new_user.username).await?.is_some() {
            return Err(AuthError::UserExists);
        }
        if self.user_repo.find_by_email(&new_user.email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = self.hasher.hash_blocking(new_user.password).await?;
        let row = self
            .user_repo
            .create(CreateUser {
                username: new_user.username,
                email: new_user.email,
                password_hash,
                role: new_user.role.unwrap_or_default(),
            })
            .await?;

        tracing::info!(user_id = %row.user_id(), role = %row.role(), "User registered");
        Ok(row.profile())
    }

    pub async fn get_user(&self, id: UserId) -> Result<UserProfile, AuthError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .map(|row| row.profile())
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, AuthError> {
        let rows = self.user_repo.list().await?;
        Ok(rows.iter().map(|row| row.profile()).collect())
    }

    /// Apply a profile update on behalf of `actor`
    pub async fn update_user(
        &self,
        actor: &Actor,
        target: UserId,
        changes: UserChanges,
    ) -> Result<UserProfile, AuthError> {
        // Checked before the load; a denied actor never learns whether the id exists
        ensure_can_update(actor, target)?;

        let current = self
            .user_repo
            .find_by_id(target)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let proposed = changes.apply_to(UpdateUser::from_row(&current));
        authorize_deactivation(actor, target, proposed.active)?;
        let proposed = authorize_role_change(actor, target, current.role(), proposed);
        validate_profile(&proposed.username, &proposed.email)?;

        if proposed.username != current.username {
            if let Some(other) = self.user_repo.find_by_username(&proposed.username).await? {
                if other.user_id() != target {
                    return Err(AuthError::UserExists);
                }
            }
        }
        if proposed.email != current.email {
            if let Some(other) = self.user_repo.find_by_email(&proposed.email).await? {
                if other.user_id() != target {
                    return Err(AuthError::UserExists);
                }
            }
        }

        // The store's unique constraints still back this up; a lost race
        // surfaces as Conflict and maps to UserExists
        let row = self.user_repo.update(target, proposed).await?;
        tracing::info!(actor = %actor.user_id, user_id = %target, "User updated");
        Ok(row.profile())
    }

    /// Replace a user's password on behalf of `actor`
    pub async fn update_password(
        &self,
        actor: &Actor,
        target: UserId,
        new_password: String,
    ) -> Result<(), AuthError> {
        ensure_can_update(actor, target)?;
        validate_password(&new_password)?;

        let password_hash = self.hasher.hash_blocking(new_password).await?;
        self.user_repo.update_password(target, &password_hash).await?;

        tracing::info!(actor = %actor.user_id, user_id = %target, "Password updated");
        Ok(())
    }
}

impl<U: UserRepository + ?Sized> std::fmt::Debug for UserService<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_overlay() {
        let current = UpdateUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            active: true,
        };
        let changes = UserChanges {
            email: Some("alice@new.example".to_string()),
            active: Some(false),
            ..Default::default()
        };
        let merged = changes.apply_to(current);
        assert_eq!(merged.username, "alice");
        assert_eq!(merged.email, "alice@new.example");
        assert_eq!(merged.role, Role::User);
        assert!(!merged.active);
    }

    #[test]
    fn test_validate_profile() {
        assert!(validate_profile("alice", "alice@example.com").is_ok());
        for (username, email) in [
            ("", "alice@example.com"),
            ("   ", "alice@example.com"),
            ("alice", ""),
            ("alice", "alice"),
            ("alice", "@example.com"),
            ("alice", "alice@"),
        ] {
            assert!(
                matches!(validate_profile(username, email), Err(AuthError::InvalidInput(_))),
                "{username:?} {email:?}"
            );
        }
    }

    #[test]
    fn test_new_user_role_is_optional() {
        let json = r#"{"username":"bob","email":"bob@example.com","password":"hunter22"}"#;
        let user: NewUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, None);
        assert_eq!(user.role.unwrap_or_default(), Role::User);
    }
}
