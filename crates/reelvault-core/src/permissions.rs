//! Permission constants for the Reelvault API.
//!
//! Handlers are gated on permission codes rather than roles; using these
//! constants instead of string literals keeps the codes consistent between
//! the authorization middleware, the seed data, and the tests.

use serde::{Deserialize, Serialize};

/// Permission to read movie data
pub const MOVIES_READ: &str = "movies:read";
/// Permission to create, update, and delete movies
pub const MOVIES_WRITE: &str = "movies:write";

/// The set of permission codes granted to a single user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions(Vec<String>);

impl Permissions {
    pub fn new(codes: Vec<String>) -> Self {
        Self(codes)
    }

    /// Whether the set contains `code`.
    pub fn includes(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }
}

impl FromIterator<String> for Permissions {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
