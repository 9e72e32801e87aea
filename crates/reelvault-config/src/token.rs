use std::env;

use chrono::Duration;

/// Expiry windows for issued tokens.
///
/// # Environment Variables
///
/// - `TOKEN_AUTHENTICATION_TTL_HOURS`: authentication token lifetime
///   (default: 24)
/// - `TOKEN_ACTIVATION_TTL_HOURS`: account activation token lifetime
///   (default: 72)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenConfig {
    pub authentication_ttl_hours: i64,
    pub activation_ttl_hours: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            authentication_ttl_hours: 24,
            activation_ttl_hours: 72,
        }
    }
}

impl TokenConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            authentication_ttl_hours: env::var("TOKEN_AUTHENTICATION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            activation_ttl_hours: env::var("TOKEN_ACTIVATION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(72),
        }
    }

    pub fn authentication_ttl(&self) -> Duration {
        Duration::hours(self.authentication_ttl_hours)
    }

    pub fn activation_ttl(&self) -> Duration {
        Duration::hours(self.activation_ttl_hours)
    }
}
