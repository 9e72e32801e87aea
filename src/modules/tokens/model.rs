use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload for POST /v1/tokens/authentication.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthenticationTokenDto {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 characters"))]
    pub password: String,
}

/// Response body for a freshly issued authentication token. The plaintext
/// appears here and nowhere else.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticationTokenResponse {
    pub authentication_token: TokenCredentials,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenCredentials {
    pub token: String,
    pub expiry: DateTime<Utc>,
}
