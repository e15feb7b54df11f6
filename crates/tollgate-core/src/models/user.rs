//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TollgateError;

/// Numeric user identifier assigned by the store.
pub type UserId = u64;

/// A stored user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for the user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    /// Argon2id PHC string. Plaintext never reaches the store.
    pub password_hash: String,
    pub role_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub role_id: Option<u64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

/// Caller-facing view of a [`User`]. Carries no password material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub role_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role_id: user.role_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_admin: user.is_admin,
            is_active: user.is_active,
        }
    }
}

/// Signup request as submitted by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub username: String,
    /// Plaintext; hashed before the record is built.
    pub password: String,
    pub role_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl NewUserRequest {
    /// Reject payloads the store would refuse anyway.
    pub fn validate(&self) -> Result<(), TollgateError> {
        if self.username.trim().is_empty() {
            return Err(invalid("username must not be empty"));
        }
        if self.username.chars().any(char::is_whitespace) {
            return Err(invalid("username must not contain whitespace"));
        }
        if self.password.is_empty() {
            return Err(invalid("password must not be empty"));
        }
        if !is_plausible_email(&self.email) {
            return Err(invalid("email address is malformed"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> TollgateError {
    TollgateError::InvalidArgument {
        message: message.into(),
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}
