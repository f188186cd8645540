use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::values::{Email, UserId};

/// Repository trait for User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by id, `None` when absent
    async fn find_by_id(&self, id: &UserId) -> UserResult<Option<User>>;

    /// Get a user by email, `None` when absent
    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>>;

    /// List all users, newest first
    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Insert or replace a user keyed by id.
    ///
    /// A concurrent save of the same email surfaces as `DuplicateEmail`.
    async fn save(&self, user: &User) -> UserResult<()>;

    /// Delete a user by id; absent ids are a no-op
    async fn delete(&self, id: &UserId) -> UserResult<()>;

    /// Check whether a user with this id exists
    async fn exists(&self, id: &UserId) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email() == email).cloned())
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(result)
    }

    async fn save(&self, user: &User) -> UserResult<()> {
        let mut users = self.users.write().await;

        // Mirror the unique index on email: reject a save whose email
        // belongs to a different id.
        let email_taken = users
            .values()
            .any(|u| u.id() != user.id() && u.email() == user.email());

        if email_taken {
            return Err(UserError::DuplicateEmail(user.email().to_string()));
        }

        users.insert(user.id().clone(), user.clone());

        tracing::debug!(user_id = %user.id(), email = %user.email(), "Saved user");
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> UserResult<()> {
        let mut users = self.users.write().await;

        if users.remove(id).is_some() {
            tracing::debug!(user_id = %id, "Deleted user");
        }
        Ok(())
    }

    async fn exists(&self, id: &UserId) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.contains_key(id))
    }
}
