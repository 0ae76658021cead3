use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::USERNAME_MAX_LEN;
use crate::errors::{FieldErrors, Result};

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input for registering an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", "cannot be empty");
        } else if username.chars().count() > USERNAME_MAX_LEN {
            errors.add(
                "username",
                format!("must be at most {} characters", USERNAME_MAX_LEN),
            );
        } else if username.chars().any(char::is_whitespace) {
            errors.add("username", "cannot contain whitespace");
        }
        if let Some(email) = self.email.as_deref().map(str::trim) {
            if !email.is_empty() && !email.contains('@') {
                errors.add("email", "is not a valid address");
            }
        }
        if self.password_hash.is_empty() {
            errors.add("password", "cannot be empty");
        }
        errors.into_result()
    }
}

/// Stored login material; never serialized.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}
