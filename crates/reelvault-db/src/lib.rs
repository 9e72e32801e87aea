//! # Reelvault DB
//!
//! PostgreSQL connection pool initialization for the Reelvault API.

use std::env;

/// Initializes the PostgreSQL connection pool from `DATABASE_URL`.
///
/// Called once during startup; the returned [`PgPool`] is cheaply cloneable
/// and is handed to the store implementations through the application state.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset or the database is unreachable — there
/// is nothing useful the server can do without storage.
pub async fn init_db_pool() -> sqlx::PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
