use std::collections::BTreeMap;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failures surfaced by the storage layer, independent of HTTP concerns.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    /// The record's version stamp changed since it was read.
    #[error("edit conflict")]
    EditConflict,
    #[error("duplicate email")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return StoreError::NotFound;
        }
        if err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            return StoreError::DuplicateEmail;
        }
        StoreError::Other(err.into())
    }
}

/// The payload of an error response: a single message, or a field→message
/// map for validation failures.
#[derive(Debug, Clone)]
pub enum ErrorBody {
    Message(String),
    Fields(BTreeMap<String, String>),
}

/// Application error carrying the HTTP status and response body.
///
/// Every failure surfaced to a caller goes through this type, keeping the
/// body shape `{"error": <string | {field: message}>}` uniform across the
/// whole API.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    body: ErrorBody,
    authenticate_challenge: bool,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::Message(message.into()),
            authenticate_challenge: false,
        }
    }

    /// Internal fault: the detail is logged, never sent to the caller.
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        let err = err.into();
        tracing::error!(error = ?err, "internal server error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "the server encountered a problem and could not process your request",
        )
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "the requested resource could not be found",
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn edit_conflict() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            "unable to update the record due to an edit conflict, please try again",
        )
    }

    pub fn rate_limit_exceeded() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded")
    }

    /// 401 for a missing, malformed, expired, or unknown token. Carries the
    /// `WWW-Authenticate: Bearer` challenge so clients learn the scheme.
    pub fn invalid_authentication_token() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorBody::Message("invalid or missing authentication token".to_string()),
            authenticate_challenge: true,
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid authentication credentials")
    }

    pub fn authentication_required() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "you must be authenticated to access this resource",
        )
    }

    pub fn inactive_account() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "your user account must be activated to access this resource",
        )
    }

    pub fn not_permitted() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "your user account doesn't have the necessary permissions to access this resource",
        )
    }

    pub fn failed_validation(fields: BTreeMap<String, String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorBody::Fields(fields),
            authenticate_challenge: false,
        }
    }

    /// Single-field 422, for validation failures found outside the derive
    /// machinery.
    pub fn validation_field(field: &str, message: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.to_string());
        Self::failed_validation(fields)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::not_found(),
            StoreError::EditConflict => AppError::edit_conflict(),
            StoreError::DuplicateEmail => {
                AppError::validation_field("email", "a user with this email address already exists")
            }
            StoreError::Other(err) => AppError::internal(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self.body {
            ErrorBody::Message(message) => json!({ "error": message }),
            ErrorBody::Fields(fields) => json!({ "error": fields }),
        };

        let mut response = (self.status, Json(body)).into_response();
        if self.authenticate_challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
