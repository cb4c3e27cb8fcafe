//! In-memory user repository
//!
//! Backed by `DashMap`. Enforces the same username/email uniqueness as the
//! PostgreSQL schema, reserving index keys through the entry API so two
//! concurrent writers cannot claim the same name.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use datapolis_types::UserId;

use crate::error::{DbError, DbResult};
use crate::models::UserRow;
use crate::repo::{CreateUser, UpdateUser, UserRepository};

/// In-memory user repository
#[derive(Clone)]
pub struct MemoryUserRepository {
    users: Arc<DashMap<i64, UserRow>>,
    by_username: Arc<DashMap<String, i64>>,
    by_email: Arc<DashMap<String, i64>>,
    next_id: Arc<AtomicI64>,
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self {
            users: Arc::default(),
            by_username: Arc::default(),
            by_email: Arc::default(),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user outright (the service layer never deletes)
    pub fn remove(&self, id: UserId) -> Option<UserRow> {
        let (_, user) = self.users.remove(&id.0)?;
        self.by_username.remove(&user.username);
        self.by_email.remove(&user.email);
        Some(user)
    }

    /// Number of stored users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Claim `key` in `index` for `id`. Succeeds if the key is free or
    /// already owned by `id`; returns whether a new entry was inserted.
    fn reserve(index: &DashMap<String, i64>, key: &str, id: i64, what: &str) -> DbResult<bool> {
        match index.entry(key.to_string()) {
            Entry::Occupied(entry) if *entry.get() == id => Ok(false),
            Entry::Occupied(_) => Err(DbError::Conflict(format!("users_{what}_key"))),
            Entry::Vacant(entry) => {
                entry.insert(id);
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id.0).map(|r| r.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        // Copy the id out first; holding an index guard while locking
        // `users` would invert the lock order `update` uses
        let id = self.by_username.get(username).map(|r| *r.value());
        Ok(id.and_then(|id| self.users.get(&id).map(|r| r.value().clone())))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        let id = self.by_email.get(email).map(|r| *r.value());
        Ok(id.and_then(|id| self.users.get(&id).map(|r| r.value().clone())))
    }

    async fn list(&self) -> DbResult<Vec<UserRow>> {
        let mut users: Vec<UserRow> = self.users.iter().map(|r| r.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        Self::reserve(&self.by_username, &user.username, id, "username")?;
        if let Err(e) = Self::reserve(&self.by_email, &user.email, id, "email") {
            self.by_username.remove(&user.username);
            return Err(e);
        }

        let now = Utc::now();
        let row = UserRow {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: UserId, update: UpdateUser) -> DbResult<UserRow> {
        // The row guard is held across the index swaps, so concurrent
        // updates of one user are serialized
        let mut entry = self.users.get_mut(&id.0).ok_or(DbError::NotFound)?;

        let new_username = Self::reserve(&self.by_username, &update.username, id.0, "username")?;
        let new_email = match Self::reserve(&self.by_email, &update.email, id.0, "email") {
            Ok(inserted) => inserted,
            Err(e) => {
                if new_username {
                    self.by_username.remove(&update.username);
                }
                return Err(e);
            }
        };

        if new_username {
            self.by_username.remove(&entry.username);
        }
        if new_email {
            self.by_email.remove(&entry.email);
        }

        entry.username = update.username;
        entry.email = update.email;
        entry.role = update.role.as_str().to_string();
        entry.active = update.active;
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> DbResult<()> {
        let mut user = self.users.get_mut(&id.0).ok_or(DbError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datapolis_types::Role;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_memory_user_repo_crud() {
        let repo = MemoryUserRepository::new();

        // Create
        let user = repo.create(new_user("alice", "alice@example.com")).await.unwrap();
        assert_eq!(user.id, 1);
        assert!(user.active);
        assert_eq!(user.role, "user");

        // Lookups
        assert!(repo.find_by_id(UserId(1)).await.unwrap().is_some());
        assert!(repo.find_by_username("alice").await.unwrap().is_some());
        assert!(repo.find_by_email("alice@example.com").await.unwrap().is_some());
        assert!(repo.find_by_username("bob").await.unwrap().is_none());

        // Update
        let mut update = UpdateUser::from_row(&user);
        update.username = "alice2".to_string();
        update.role = Role::Admin;
        let updated = repo.update(UserId(1), update).await.unwrap();
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.role, "admin");
        assert!(repo.find_by_username("alice").await.unwrap().is_none());
        assert!(repo.find_by_username("alice2").await.unwrap().is_some());

        // Password
        repo.update_password(UserId(1), "new-hash").await.unwrap();
        let found = repo.find_by_id(UserId(1)).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("alice", "alice@example.com")).await.unwrap();

        let dup_name = repo.create(new_user("alice", "other@example.com")).await;
        assert!(matches!(dup_name, Err(DbError::Conflict(_))));

        let dup_email = repo.create(new_user("bob", "alice@example.com")).await;
        assert!(matches!(dup_email, Err(DbError::Conflict(_))));

        // The failed insert must not leave a dangling username reservation
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
        repo.create(new_user("bob", "bob@example.com")).await.unwrap();
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_update_into_taken_email_conflicts() {
        let repo = MemoryUserRepository::new();
        let alice = repo.create(new_user("alice", "alice@example.com")).await.unwrap();
        repo.create(new_user("carol", "carol@example.com")).await.unwrap();

        let mut update = UpdateUser::from_row(&alice);
        update.username = "alice-renamed".to_string();
        update.email = "carol@example.com".to_string();
        let result = repo.update(alice.user_id(), update).await;
        assert!(matches!(result, Err(DbError::Conflict(_))));

        // Nothing changed, including the username reservation
        let found = repo.find_by_id(alice.user_id()).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(repo.find_by_username("alice-renamed").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_renames_keep_index_consistent() {
        for _ in 0..100 {
            let repo = MemoryUserRepository::new();
            let alice = repo.create(new_user("alice", "alice@example.com")).await.unwrap();

            let tasks: Vec<_> = ["a1", "a2"]
                .into_iter()
                .map(|name| {
                    let repo = repo.clone();
                    let mut update = UpdateUser::from_row(&alice);
                    update.username = name.to_string();
                    tokio::spawn(async move { repo.update(UserId(1), update).await })
                })
                .collect();
            for task in tasks {
                task.await.unwrap().unwrap();
            }

            let row = repo.find_by_id(UserId(1)).await.unwrap().unwrap();
            for name in ["alice", "a1", "a2"] {
                match repo.find_by_username(name).await.unwrap() {
                    Some(found) => assert_eq!(found.username, name),
                    None => assert_ne!(row.username, name),
                }
            }
            assert!(repo.find_by_username(&row.username).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let repo = MemoryUserRepository::new();
        let update = UpdateUser {
            username: "ghost".to_string(),
            email: "ghost@example.com".to_string(),
            role: Role::User,
            active: true,
        };
        assert!(matches!(repo.update(UserId(9), update).await, Err(DbError::NotFound)));
        assert!(matches!(
            repo.update_password(UserId(9), "h").await,
            Err(DbError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_remove_frees_names() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("a", "a@example.com")).await.unwrap();
        repo.create(new_user("b", "b@example.com")).await.unwrap();
        repo.create(new_user("c", "c@example.com")).await.unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        repo.remove(UserId(2)).unwrap();
        assert!(repo.find_by_id(UserId(2)).await.unwrap().is_none());
        repo.create(new_user("b", "b@example.com")).await.unwrap();
    }
}
