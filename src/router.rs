use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware, routing::get};
use reelvault_config::CorsConfig;
use tower_http::cors::CorsLayer;

use crate::metrics;
use crate::middleware::authenticate::authenticate;
use crate::middleware::logging::log_requests;
use crate::middleware::panics::catch_panics;
use crate::middleware::rate_limit::rate_limit;
use crate::modules::health::router::init_health_router;
use crate::modules::movies::router::init_movies_router;
use crate::modules::tokens::router::init_tokens_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Assembles the application.
///
/// The pipeline order is fixed, outermost first: panic guard → metrics →
/// request logging → CORS → rate limiting → authentication → per-route
/// gates → handler. The panic guard sits outside everything so a fault in
/// any other layer still produces a well-formed 500.
pub fn init_router(state: AppState) -> Router {
    let router = Router::new()
        .nest(
            "/v1",
            Router::new()
                .merge(init_health_router())
                .nest("/movies", init_movies_router(state.clone()))
                .nest("/users", init_users_router())
                .nest("/tokens", init_tokens_router()),
        )
        .route("/debug/metrics", get(metrics::metrics_snapshot))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let router = match cors_layer(&state.cors_config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .layer(middleware::from_fn(log_requests))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::record_metrics,
        ))
        .layer(catch_panics())
        .with_state(state)
}

/// No trusted origins means no CORS handling at all. With origins
/// configured, exact matches are echoed back and preflights are answered
/// directly with the fixed method and header lists.
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.is_enabled() {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .trusted_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::OPTIONS, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}
