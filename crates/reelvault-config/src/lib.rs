//! # Reelvault Config
//!
//! Configuration types for the Reelvault API, loaded from environment
//! variables with sensible defaults:
//!
//! - [`cors`]: trusted origins for cross-origin requests
//! - [`rate_limit`]: per-client rate limiting shape
//! - [`token`]: expiry windows for issued tokens
//!
//! # Example
//!
//! ```ignore
//! use reelvault_config::{CorsConfig, RateLimitConfig, TokenConfig};
//!
//! let cors_config = CorsConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! let token_config = TokenConfig::from_env();
//! ```

pub mod cors;
pub mod rate_limit;
pub mod token;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use rate_limit::RateLimitConfig;
pub use token::TokenConfig;
