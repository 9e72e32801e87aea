//! Middleware for the request-processing pipeline.
//!
//! Applied outermost-first: panic recovery, metrics, request logging, CORS,
//! rate limiting, authentication, then the per-route authorization gates.
//!
//! # Modules
//!
//! - [`authenticate`]: resolves the `Authorization` header into a principal
//! - [`authorize`]: stackable gates (authenticated / activated / permission)
//! - [`logging`]: one log line per request
//! - [`panics`]: last-resort fault boundary
//! - [`rate_limit`]: per-client token buckets with background eviction

pub mod authenticate;
pub mod authorize;
pub mod logging;
pub mod panics;
pub mod rate_limit;
