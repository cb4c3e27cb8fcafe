//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use datapolis_types::{Identity, Role, UserId, UserProfile};
use sqlx::FromRow;

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Parsed role; unknown values are treated as the least privileged role
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_else(|_| {
            tracing::warn!(user_id = self.id, role = %self.role, "Unknown role in users table");
            Role::User
        })
    }

    /// Identity that tokens for this user are bound to
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.user_id(),
            username: self.username.clone(),
            role: self.role(),
        }
    }

    /// Public profile without the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role(),
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            role: role.to_string(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_identity_from_row() {
        let identity = row("admin").identity();
        assert_eq!(identity.id, UserId(7));
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_unknown_role_is_least_privileged() {
        assert_eq!(row("root").role(), Role::User);
    }

    #[test]
    fn test_profile_omits_hash() {
        let json = format!("{:?}", row("user").profile());
        assert!(!json.contains("argon2"));
    }
}
