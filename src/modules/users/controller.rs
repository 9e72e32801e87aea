use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use reelvault_auth::{SCOPE_ACTIVATION, generate_token, token_hash};
use reelvault_core::permissions;

use crate::modules::users::model::{ActivateUserDto, RegisterUserDto, User};
use crate::state::AppState;
use crate::utils::errors::{AppError, StoreError};
use crate::utils::password::hash_password;
use crate::validator::ValidatedJson;

/// POST /v1/users
///
/// Accounts start deactivated; an activation-scope token is issued alongside.
/// There is no mail transport in this build, so the token goes to the
/// operator log instead of an outbox.
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterUserDto>,
) -> Result<impl IntoResponse, AppError> {
    let password_hash = hash_password(&dto.password)?;
    let user = state
        .users
        .insert(&dto.name, &dto.email, &password_hash)
        .await?;

    // New accounts can browse the catalog once activated.
    state
        .permissions
        .grant(user.id, &[permissions::MOVIES_READ])
        .await?;

    let token = generate_token(user.id, state.token_config.activation_ttl(), SCOPE_ACTIVATION);
    state.tokens.insert(&token).await?;
    tracing::debug!(user_id = %user.id, activation_token = %token.plaintext, "activation token issued");

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /v1/users/activated
pub async fn activate_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ActivateUserDto>,
) -> Result<Json<User>, AppError> {
    let mut user = match state
        .users
        .get_for_token(SCOPE_ACTIVATION, &token_hash(&dto.token))
        .await
    {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            return Err(AppError::validation_field(
                "token",
                "invalid or expired activation token",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    user.activated = true;
    // A concurrent activation of the same account loses here with a 409.
    user.version = state.users.update(&user).await?;

    state
        .tokens
        .delete_all_for_user(SCOPE_ACTIVATION, user.id)
        .await?;

    Ok(Json(user))
}
