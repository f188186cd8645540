use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserResponse};
use crate::repository::UserRepository;
use crate::values::{Email, UserId};

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        let email = Email::parse(&input.email)?;

        // Uniqueness check up front for a friendly 409. The unique index
        // on email catches the race where two creates interleave here.
        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(UserError::DuplicateEmail(email.to_string()));
        }

        let user = User::create(email, &input.name)?;
        self.repository.save(&user).await?;

        tracing::info!(user_id = %user.id(), "Created user");
        Ok(user.into())
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: &str) -> UserResult<UserResponse> {
        let id = UserId::parse(id)?;
        let user = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        Ok(user.into())
    }

    /// List all users, newest first
    pub async fn list_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.find_all().await?;
        Ok(users.into_iter().map(|u| u.into()).collect())
    }

    /// Update a user's name and/or email
    pub async fn update_user(&self, id: &str, input: UpdateUser) -> UserResult<UserResponse> {
        let id = UserId::parse(id)?;

        let user = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        // Reject an email owned by a different user; re-submitting the
        // user's own email is fine.
        let new_email = match input.email.as_deref() {
            Some(raw) => {
                let email = Email::parse(raw)?;
                if let Some(owner) = self.repository.find_by_email(&email).await? {
                    if owner.id() != &id {
                        return Err(UserError::DuplicateEmail(email.to_string()));
                    }
                }
                Some(email)
            }
            None => None,
        };

        let updated = user.update(input.name.as_deref(), new_email)?;
        self.repository.save(&updated).await?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(updated.into())
    }

    /// Delete a user
    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        let id = UserId::parse(id)?;

        if !self.repository.exists(&id).await? {
            return Err(UserError::NotFound(id.to_string()));
        }

        self.repository.delete(&id).await?;

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }
}
