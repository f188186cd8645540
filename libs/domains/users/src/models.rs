use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::values::{Email, UserId};

/// User entity.
///
/// Fields are private so every instance goes through validation. Updates
/// return a fresh entity instead of mutating in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated id and current timestamps.
    pub fn create(email: Email, name: &str) -> UserResult<Self> {
        let name = Self::validate_name(name)?;
        let now = Utc::now();
        Ok(Self {
            id: UserId::generate(),
            email,
            name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a user from stored fields, trusting persisted timestamps.
    pub fn reconstitute(
        id: UserId,
        email: Email,
        name: &str,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> UserResult<Self> {
        let name = Self::validate_name(name)?;
        Ok(Self {
            id,
            email,
            name,
            created_at,
            updated_at,
        })
    }

    /// Change the display name, producing a new entity.
    pub fn rename(&self, new_name: &str) -> UserResult<Self> {
        self.update(Some(new_name), None)
    }

    /// Change the email address, producing a new entity.
    pub fn change_email(&self, new_email: Email) -> UserResult<Self> {
        self.update(None, Some(new_email))
    }

    /// Apply an update, producing a new entity.
    ///
    /// Both fields changing in one call share a single timestamp. With
    /// nothing to change the entity comes back untouched, updated_at
    /// included.
    pub fn update(&self, name: Option<&str>, email: Option<Email>) -> UserResult<Self> {
        if name.is_none() && email.is_none() {
            return Ok(self.clone());
        }
        let name = match name {
            Some(n) => Self::validate_name(n)?,
            None => self.name.clone(),
        };
        let email = email.unwrap_or_else(|| self.email.clone());
        Ok(Self {
            id: self.id.clone(),
            email,
            name,
            created_at: self.created_at,
            updated_at: Utc::now(),
        })
    }

    fn validate_name(name: &str) -> UserResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UserError::Validation("Name cannot be empty".to_string()));
        }
        Ok(trimmed.to_string())
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// User response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into_string(),
            email: user.email.into_string(),
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// DTO for updating an existing user
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    #[test]
    fn create_trims_name_and_sets_equal_timestamps() {
        let user = User::create(email("a@b.co"), "  Alice  ").unwrap();
        assert_eq!(user.name(), "Alice");
        assert_eq!(user.created_at(), user.updated_at());
        assert!(!user.id().as_str().is_empty());
    }

    #[test]
    fn create_rejects_blank_name() {
        assert!(matches!(
            User::create(email("a@b.co"), "   "),
            Err(UserError::Validation(_))
        ));
    }

    #[test]
    fn update_name_keeps_email_and_created_at() {
        let user = User::create(email("a@b.co"), "Alice").unwrap();
        let renamed = user.update(Some("Bob"), None).unwrap();
        assert_eq!(renamed.name(), "Bob");
        assert_eq!(renamed.email(), user.email());
        assert_eq!(renamed.id(), user.id());
        assert_eq!(renamed.created_at(), user.created_at());
        assert!(renamed.updated_at() >= user.updated_at());
    }

    #[test]
    fn update_both_fields_shares_one_timestamp() {
        let user = User::create(email("a@b.co"), "Alice").unwrap();
        let updated = user
            .update(Some("Bob"), Some(email("bob@b.co")))
            .unwrap();
        assert_eq!(updated.name(), "Bob");
        assert_eq!(updated.email().as_str(), "bob@b.co");
        assert_eq!(updated.created_at(), user.created_at());
        assert!(updated.updated_at() >= user.updated_at());
    }

    #[test]
    fn update_with_nothing_returns_identical_entity() {
        let user = User::create(email("a@b.co"), "Alice").unwrap();
        let same = user.update(None, None).unwrap();
        assert_eq!(same, user);
    }

    #[test]
    fn update_rejects_blank_name() {
        let user = User::create(email("a@b.co"), "Alice").unwrap();
        assert!(user.update(Some(" "), None).is_err());
    }

    #[test]
    fn response_uses_camel_case_timestamps() {
        let user = User::create(email("a@b.co"), "Alice").unwrap();
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
