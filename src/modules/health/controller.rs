use axum::{Json, extract::State};
use serde::Serialize;

use crate::modules::users::model::Principal;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub system_info: SystemInfo,
}

/// GET /v1/healthcheck
///
/// Liveness probe with build metadata. Reports the caller's name when the
/// request carried valid credentials.
pub async fn healthcheck(
    State(state): State<AppState>,
    principal: Principal,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "available",
        system_info: SystemInfo {
            environment: state.environment.clone(),
            user_name: principal.user().map(|user| user.name.clone()),
            version: env!("CARGO_PKG_VERSION"),
        },
    })
}
