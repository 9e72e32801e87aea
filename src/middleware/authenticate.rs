//! Bearer-token authentication.
//!
//! Resolves the `Authorization` header into a [`Principal`] and attaches it
//! to the request. Exactly one principal is attached per request; the
//! authorization gates read it and never replace it.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use reelvault_auth::{SCOPE_AUTHENTICATION, token_hash, valid_token_plaintext};

use crate::modules::users::model::Principal;
use crate::state::AppState;
use crate::utils::errors::{AppError, StoreError};

pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let mut response = match resolve_principal(&state, req.headers().get(header::AUTHORIZATION)).await
    {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    };

    // Whatever happened, caches must key on the Authorization header so one
    // caller's response is never served to another.
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn resolve_principal(
    state: &AppState,
    header: Option<&HeaderValue>,
) -> Result<Principal, AppError> {
    let Some(value) = header else {
        return Ok(Principal::Anonymous);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::invalid_authentication_token())?;
    let token = parse_bearer(value).ok_or_else(AppError::invalid_authentication_token)?;

    match state
        .users
        .get_for_token(SCOPE_AUTHENTICATION, &token_hash(token))
        .await
    {
        Ok(user) => Ok(Principal::User(user)),
        // An unknown token and an expired one are indistinguishable to the
        // caller by design.
        Err(StoreError::NotFound) => Err(AppError::invalid_authentication_token()),
        Err(err) => Err(AppError::internal(err)),
    }
}

/// Accepts exactly `Bearer <token>` where the token already has a plausible
/// shape. Anything else is rejected before the store is consulted.
fn parse_bearer(value: &str) -> Option<&str> {
    match value.split_once(' ') {
        Some(("Bearer", token)) if valid_token_plaintext(token) => Some(token),
        _ => None,
    }
}

/// Extractor handing the request's principal to handlers that want it.
///
/// The authenticator attaches a principal to every request, so a missing one
/// means the middleware is not mounted — a wiring bug, surfaced as a 500.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("no principal attached to request")))
    }
}
