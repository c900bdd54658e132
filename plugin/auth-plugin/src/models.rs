//! Authentication Models
//!
//! Database entity, request bodies and the outcome returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ============================================
// Database Entities
// ============================================

/// Persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// base64(salt || derived key)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// base64(salt)
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A user record that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn into_identity(self, id: i64) -> UserIdentity {
        UserIdentity {
            id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            password_salt: self.password_salt,
            created_at: Some(self.created_at),
        }
    }
}

// ============================================
// Request DTOs
// ============================================

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(alias = "userName")]
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(alias = "firstName")]
    #[validate(length(min = 2, max = 50, message = "First name must be 2-50 characters"))]
    pub first_name: String,

    #[serde(alias = "lastName")]
    #[validate(length(min = 2, max = 50, message = "Last name must be 2-50 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

impl RegisterRequest {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "userName")]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// ============================================
// Response DTOs
// ============================================

pub const MSG_USER_CREATED: &str = "user created";
pub const MSG_USERNAME_EXISTS: &str = "username already exists";
pub const MSG_EMAIL_EXISTS: &str = "email already exists";
pub const MSG_SAVE_FAILED: &str = "failed to save user data";
pub const MSG_INVALID_CREDENTIALS: &str = "invalid credentials";

/// Result of a register or login call.
///
/// On a successful login `message` carries the issued token; everywhere
/// else it is a status string. Callers tell them apart by `is_succeed`
/// and the operation they called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
    pub is_succeed: bool,
    pub message: String,
}

impl AuthOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            is_succeed: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_succeed: false,
            message: message.into(),
        }
    }
}
