//! Client configuration.
//!
//! The API base URL resolves from the `JARDINBIOT_API_URL` environment
//! variable when set, falling back to the local Django dev server. Token
//! refresh and verify calls run under a short timeout so a dead backend
//! cannot stall session restore; ordinary requests are unbounded and rely
//! on caller-side cancellation.

use std::time::Duration;

/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "JARDINBIOT_API_URL";

/// Default API base URL (local Django dev server).
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Timeout in seconds for token refresh and verify calls.
/// 8s fails fast enough that app startup is not held hostage by a dead backend.
const AUTH_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    auth_timeout: Duration,
}

impl ClientConfig {
    /// Configuration pointing at an explicit base URL.
    /// Trailing slashes are trimmed so request paths join cleanly.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            auth_timeout: Duration::from_secs(AUTH_TIMEOUT_SECS),
        }
    }

    /// Resolve the base URL from the environment, falling back to the
    /// local dev server.
    pub fn from_env() -> Self {
        Self::from_override(std::env::var(ENV_API_URL).ok())
    }

    fn from_override(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::new(DEFAULT_API_URL),
        }
    }

    /// Override the timeout applied to token refresh and verify calls.
    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_timeout(&self) -> Duration {
        self.auth_timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
