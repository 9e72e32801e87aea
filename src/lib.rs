//! # Reelvault API
//!
//! A JSON movie-catalog API built with Axum and PostgreSQL. The interesting
//! part is the request-processing pipeline in front of the resource
//! handlers: opaque bearer-token authentication, permission-gated
//! authorization, per-client rate limiting with background eviction, panic
//! recovery, request metrics, and CORS negotiation.
//!
//! ## Pipeline
//!
//! Every request passes through, outermost first:
//!
//! ```text
//! panic guard → metrics → request logging → CORS → rate limiter
//!             → authenticator → authorization gates → handler
//! ```
//!
//! The authenticator attaches exactly one [`Principal`] per request —
//! anonymous when no credentials are presented, otherwise the account
//! resolved from the bearer token's digest. The gates read that principal
//! and fail fast: 401 for anonymous callers, 403 for unactivated accounts or
//! missing permissions. Rate limiting keys on the client IP with one token
//! bucket per client, evicted after three idle minutes.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # The pipeline: authenticate, authorize, logging,
//! │                     # panics, rate_limit
//! ├── modules/          # Feature modules
//! │   ├── health/      # Liveness probe
//! │   ├── movies/      # Catalog CRUD with optimistic concurrency
//! │   ├── tokens/      # Authentication token issuance
//! │   └── users/       # Registration and activation
//! ├── metrics.rs        # Process-wide request counters
//! ├── router.rs         # Route wiring and pipeline assembly
//! ├── state.rs          # Shared application state
//! └── utils/            # Errors, password hashing
//! ```
//!
//! Each feature module follows the same structure: `model.rs`,
//! `controller.rs`, `service.rs` (store trait + Postgres implementation),
//! and `router.rs`.
//!
//! ## Concurrency
//!
//! Mutable resources carry a version stamp; updates are compare-and-set and
//! the loser of a race observes a 409 rather than silently overwriting.
//! There are no locks on the read path: metrics are atomics, and the limiter
//! registry takes one short-lived mutex per request.
//!
//! [`Principal`]: modules::users::model::Principal

pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use reelvault_auth;
pub use reelvault_config;
pub use reelvault_core;
pub use reelvault_db;
