//! User entities, the request principal, and user-facing DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// The identity resolved for a request: nobody (no credentials presented),
/// or a concrete account. Attached once by the authenticator and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Anonymous,
    User(User),
}

impl Principal {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Principal::User(user) => Some(user),
            Principal::Anonymous => None,
        }
    }
}

/// A registered account.
///
/// `password_hash` never leaves the server. `version` is the optimistic
/// concurrency stamp used by the activation flow; it is not part of the
/// public representation either.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub activated: bool,
    #[serde(skip_serializing)]
    pub version: i32,
}

/// Payload for POST /v1/users.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    // bcrypt truncates beyond 72 bytes, so longer inputs are rejected
    // instead of silently shortened.
    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 characters"))]
    pub password: String,
}

/// Payload for PUT /v1/users/activated.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActivateUserDto {
    #[validate(custom(function = validate_token_plaintext))]
    pub token: String,
}

fn validate_token_plaintext(token: &str) -> Result<(), ValidationError> {
    if !reelvault_auth::valid_token_plaintext(token) {
        let mut err = ValidationError::new("token");
        err.message = Some("must be a valid 26-character token".into());
        return Err(err);
    }
    Ok(())
}
