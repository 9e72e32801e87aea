use std::env;

/// Origins trusted for cross-origin requests.
///
/// An empty list means CORS handling is disabled entirely: no headers are
/// added and preflight requests fall through to normal routing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub trusted_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let trusted_origins = env::var("CORS_TRUSTED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { trusted_origins }
    }

    pub fn is_enabled(&self) -> bool {
        !self.trusted_origins.is_empty()
    }
}
