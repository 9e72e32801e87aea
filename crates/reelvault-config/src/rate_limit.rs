//! Rate limiting configuration.
//!
//! The limiter is a token bucket per client: tokens replenish at
//! `requests_per_second` and accumulate up to `burst`. Each request consumes
//! one token; requests finding an empty bucket are rejected with 429.
//!
//! # Environment Variables
//!
//! - `RATE_LIMIT_ENABLED`: set to `false` or `0` to disable (default: enabled)
//! - `RATE_LIMIT_RPS`: token replenishment rate (default: 2)
//! - `RATE_LIMIT_BURST`: maximum token accumulation (default: 4)

use std::env;

/// Shape of the per-client token bucket, plus the global on/off switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Whether rate limiting is applied at all. When disabled, no limiter
    /// state is kept for any client.
    pub enabled: bool,

    /// Token replenishment rate per client.
    pub requests_per_second: u32,

    /// Maximum tokens a client can accumulate, allowing short bursts above
    /// the steady-state rate.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 2,
            burst: 4,
        }
    }
}

impl RateLimitConfig {
    /// Creates a `RateLimitConfig` from environment variables, falling back
    /// to the defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("RATE_LIMIT_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            requests_per_second: env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            burst: env::var("RATE_LIMIT_BURST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
        }
    }

    /// A disabled config, for wiring up tests and tooling that should never
    /// be throttled.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
