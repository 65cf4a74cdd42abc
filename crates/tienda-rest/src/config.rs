//! Client configuration.

use std::time::Duration;

use tienda_core::{ApiUrl, Result};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: ApiUrl,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration for the given base URL with default timeout and user agent.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("tienda/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Parse and validate a base URL.
    pub fn from_url(base_url: &str) -> Result<Self> {
        Ok(Self::new(ApiUrl::new(base_url)?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
