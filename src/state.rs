use std::sync::Arc;

use reelvault_config::{CorsConfig, RateLimitConfig, TokenConfig};
use reelvault_db::init_db_pool;

use crate::metrics::Metrics;
use crate::middleware::rate_limit::LimiterRegistry;
use crate::modules::movies::service::{MovieStore, PgMovieStore};
use crate::modules::tokens::service::{PgTokenStore, TokenStore};
use crate::modules::users::service::{PermissionStore, PgPermissionStore, PgUserStore, UserStore};

/// Shared application state, cheap to clone per request.
///
/// Stores are held behind trait objects so tests can substitute in-memory
/// implementations for the Postgres ones.
#[derive(Clone)]
pub struct AppState {
    pub environment: String,
    pub movies: Arc<dyn MovieStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub token_config: TokenConfig,
    pub limiter: Arc<LimiterRegistry>,
    pub metrics: Arc<Metrics>,
}

pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;
    let rate_limit_config = RateLimitConfig::from_env();

    AppState {
        environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        movies: Arc::new(PgMovieStore::new(db.clone())),
        users: Arc::new(PgUserStore::new(db.clone())),
        tokens: Arc::new(PgTokenStore::new(db.clone())),
        permissions: Arc::new(PgPermissionStore::new(db)),
        cors_config: CorsConfig::from_env(),
        limiter: Arc::new(LimiterRegistry::new(rate_limit_config.clone())),
        rate_limit_config,
        token_config: TokenConfig::from_env(),
        metrics: Arc::new(Metrics::new()),
    }
}
