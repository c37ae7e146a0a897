//! User domain model.
//!
//! # Responsibility
//! - Define the persisted `User` record and its in-memory draft `NewUser`.
//! - Define `UserPatch`, the partial-update request.
//! - Own field-level validation shared by write paths.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes.
//! - `created_at` is stamped once at first persistence and never changes.
//! - `email` is unique across users (enforced by the store).

use crate::validation::email;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned user identifier.
pub type UserId = i64;

/// Maximum name length in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Maximum email length in characters.
pub const EMAIL_MAX_CHARS: usize = 150;

/// Persisted user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    /// UTC instant of first persistence.
    pub created_at: DateTime<Utc>,
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[User INFO] id = {}, username = '{}', email = '{}', age = {}, createdAt = {}",
            self.id,
            self.name,
            self.email,
            self.age
                .map_or_else(|| "-".to_string(), |age| age.to_string()),
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

/// User draft built from console input, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: Option<i32>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    /// Validates field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        Ok(())
    }
}

/// Partial update request.
///
/// `None` keeps the stored value. Empty strings are treated the same as `None`
/// so console input of a bare Enter never blanks a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl UserPatch {
    /// Name to write, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|value| !value.is_empty())
    }

    /// Email to write, if any.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|value| !value.is_empty())
    }

    /// Returns true when the patch would not touch any column.
    pub fn is_empty(&self) -> bool {
        self.name().is_none() && self.email().is_none() && self.age.is_none()
    }

    /// Validates only the supplied fields.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if let Some(name) = self.name() {
            validate_name(name)?;
        }
        if let Some(email) = self.email() {
            validate_email(email)?;
        }
        Ok(())
    }
}

/// Field-level validation failure for user writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong { chars: usize },
    EmailTooLong { chars: usize },
    InvalidEmail,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::NameTooLong { chars } => write!(
                f,
                "name has {chars} characters, at most {NAME_MAX_CHARS} allowed"
            ),
            Self::EmailTooLong { chars } => write!(
                f,
                "email has {chars} characters, at most {EMAIL_MAX_CHARS} allowed"
            ),
            Self::InvalidEmail => write!(f, "email has an invalid format"),
        }
    }
}

impl Error for UserValidationError {}

fn validate_name(name: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    let chars = name.chars().count();
    if chars > NAME_MAX_CHARS {
        return Err(UserValidationError::NameTooLong { chars });
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), UserValidationError> {
    let chars = value.chars().count();
    if chars > EMAIL_MAX_CHARS {
        return Err(UserValidationError::EmailTooLong { chars });
    }
    if !email::is_valid(value) {
        return Err(UserValidationError::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewUser, User, UserPatch, UserValidationError, NAME_MAX_CHARS};
    use chrono::{TimeZone, Utc};

    #[test]
    fn new_user_validate_checks_name_and_email() {
        assert!(NewUser::new("Alice", "alice@example.com", Some(30))
            .validate()
            .is_ok());
        assert_eq!(
            NewUser::new("  ", "alice@example.com", None).validate(),
            Err(UserValidationError::EmptyName)
        );
        assert_eq!(
            NewUser::new("Alice", "alice", None).validate(),
            Err(UserValidationError::InvalidEmail)
        );

        let long_name = "x".repeat(NAME_MAX_CHARS + 1);
        assert_eq!(
            NewUser::new(long_name, "alice@example.com", None).validate(),
            Err(UserValidationError::NameTooLong {
                chars: NAME_MAX_CHARS + 1
            })
        );
    }

    #[test]
    fn patch_treats_empty_strings_as_absent() {
        let patch = UserPatch {
            name: Some(String::new()),
            email: Some(String::new()),
            age: None,
        };
        assert!(patch.is_empty());
        assert!(patch.validate().is_ok());

        let age_only = UserPatch {
            age: Some(31),
            ..UserPatch::default()
        };
        assert!(!age_only.is_empty());
    }

    #[test]
    fn patch_validates_only_supplied_fields() {
        let patch = UserPatch {
            email: Some("broken".to_string()),
            ..UserPatch::default()
        };
        assert_eq!(patch.validate(), Err(UserValidationError::InvalidEmail));
    }

    #[test]
    fn display_matches_console_format() {
        let user = User {
            id: 7,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            age: None,
            created_at: Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap(),
        };
        assert_eq!(
            user.to_string(),
            "[User INFO] id = 7, username = 'Alice', email = 'alice@example.com', age = -, createdAt = 2026-10-14 09:30:00"
        );
    }
}
