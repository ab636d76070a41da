//! Client configuration.

use std::time::Duration;

use supplink_core::ApiUrl;

/// API base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Per-request timeout. Slow enough for a cold backend, fast enough that a
/// dead one surfaces as a network error instead of a hang.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by the public and authenticated clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api: ApiUrl,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api: ApiUrl) -> Self {
        Self {
            api,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("supplink/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
