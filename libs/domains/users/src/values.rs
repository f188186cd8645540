use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{UserError, UserResult};

// One non-whitespace local part, an @, a domain with at least one dot.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Validated, lowercase-normalized email address.
///
/// Two emails differing only in case compare equal because construction
/// lowercases the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> UserResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserError::Validation("Email cannot be empty".to_string()));
        }
        if !EMAIL_RE.is_match(trimmed) {
            return Err(UserError::Validation(format!(
                "Invalid email format: '{}'",
                raw
            )));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque user identifier.
///
/// Generated ids are UUIDv4 strings, but any non-empty string parses so
/// identifiers issued by earlier deployments keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(raw: &str) -> UserResult<Self> {
        if raw.trim().is_empty() {
            return Err(UserError::Validation(
                "User id cannot be empty".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_simple_address() {
        let email = Email::parse("alice@example.com").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn email_lowercases_and_trims() {
        let email = Email::parse("  Alice@Example.COM  ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn emails_differing_only_in_case_are_equal() {
        let a = Email::parse("Bob@Example.com").unwrap();
        let b = Email::parse("bob@example.com").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn email_rejects_empty() {
        assert!(matches!(Email::parse("   "), Err(UserError::Validation(_))));
    }

    #[test]
    fn email_rejects_missing_at() {
        assert!(Email::parse("alice.example.com").is_err());
    }

    #[test]
    fn email_rejects_missing_domain_dot() {
        assert!(Email::parse("alice@localhost").is_err());
    }

    #[test]
    fn email_rejects_whitespace_inside() {
        assert!(Email::parse("al ice@example.com").is_err());
    }

    #[test]
    fn email_rejects_multiple_ats() {
        assert!(Email::parse("a@@example.com").is_err());
    }

    #[test]
    fn user_id_generates_unique_values() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn user_id_parses_arbitrary_non_empty_string() {
        let id = UserId::parse("legacy-id-42").unwrap();
        assert_eq!(id.as_str(), "legacy-id-42");
    }

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("  ").is_err());
    }
}
