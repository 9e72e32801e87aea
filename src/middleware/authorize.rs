//! Authorization gates.
//!
//! Three stackable middleware, each a pure decorator: the request is either
//! forwarded untouched or answered on the spot. Each gate implies the ones
//! before it, so a route only ever mounts the strongest gate it needs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::modules::users::model::{Principal, User};
use crate::state::AppState;
use crate::utils::errors::AppError;

fn authenticated_user(req: &Request) -> Result<&User, AppError> {
    match req.extensions().get::<Principal>() {
        Some(Principal::User(user)) => Ok(user),
        Some(Principal::Anonymous) => Err(AppError::authentication_required()),
        None => Err(AppError::internal(anyhow::anyhow!(
            "authorization gate reached without the authenticator mounted"
        ))),
    }
}

fn activated_user(req: &Request) -> Result<&User, AppError> {
    let user = authenticated_user(req)?;
    if !user.activated {
        return Err(AppError::inactive_account());
    }
    Ok(user)
}

/// Gate: the principal must not be anonymous.
pub async fn require_authenticated_user(req: Request, next: Next) -> Response {
    match authenticated_user(&req) {
        Ok(_) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}

/// Gate: the principal must be an activated account.
pub async fn require_activated_user(req: Request, next: Next) -> Response {
    match activated_user(&req) {
        Ok(_) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}

/// Gate: the principal must hold `code`.
///
/// The permission set is looked up on every call rather than cached on the
/// principal, so a revocation takes effect on the next request. A lookup
/// failure is a 500, distinct from the permission simply being absent.
pub async fn require_permission(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    code: &'static str,
) -> Response {
    let user_id = match activated_user(&req) {
        Ok(user) => user.id,
        Err(err) => return err.into_response(),
    };

    match state.permissions.permissions_for(user_id).await {
        Ok(permissions) if permissions.includes(code) => next.run(req).await,
        Ok(_) => AppError::not_permitted().into_response(),
        Err(err) => AppError::internal(err).into_response(),
    }
}
