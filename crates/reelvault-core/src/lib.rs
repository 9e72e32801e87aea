//! # Reelvault Core
//!
//! Shared domain primitives for the Reelvault API:
//!
//! - [`permissions`]: permission code constants and the per-user permission set
//! - [`filters`]: list-query parsing, the sort safelist, and pagination metadata
//!
//! These types carry no HTTP or storage dependencies so they can be used from
//! both the API crate and its tests without pulling in the web stack.

pub mod filters;
pub mod permissions;

// Re-export commonly used types at crate root
pub use filters::{Filters, Metadata, RawFilters};
pub use permissions::Permissions;
