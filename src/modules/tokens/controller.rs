use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use reelvault_auth::{SCOPE_AUTHENTICATION, generate_token};

use crate::modules::tokens::model::{
    AuthenticationTokenResponse, CreateAuthenticationTokenDto, TokenCredentials,
};
use crate::state::AppState;
use crate::utils::errors::{AppError, StoreError};
use crate::utils::password::verify_password;
use crate::validator::ValidatedJson;

/// POST /v1/tokens/authentication
///
/// An unknown email and a wrong password produce the same 401, so the
/// endpoint cannot be used to probe which addresses have accounts.
pub async fn create_authentication_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateAuthenticationTokenDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = match state.users.get_by_email(&dto.email).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AppError::invalid_credentials()),
        Err(err) => return Err(err.into()),
    };

    if !verify_password(&dto.password, &user.password_hash)? {
        return Err(AppError::invalid_credentials());
    }

    let token = generate_token(
        user.id,
        state.token_config.authentication_ttl(),
        SCOPE_AUTHENTICATION,
    );
    state.tokens.insert(&token).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthenticationTokenResponse {
            authentication_token: TokenCredentials {
                token: token.plaintext,
                expiry: token.expiry,
            },
        }),
    ))
}
