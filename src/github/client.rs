//! GitHub client configuration

use crate::core::config::ActivityConfig;
use std::time::Duration;

/// Configuration for the GitHub API client
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// API base URL, without a trailing slash
    pub base_url: String,

    /// Token sent as `Authorization: token <token>`
    pub token: Option<String>,

    pub user_agent: String,

    /// Timeout for requests in seconds
    pub timeout_secs: u64,

    /// Retries for 5xx responses and connection failures
    pub max_retries: usize,

    /// Delay before the first retry; grows linearly per attempt
    pub retry_backoff: Duration,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: format!("fork-activity/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl GitHubClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the client configuration for a gather run
    pub fn from_activity_config(config: &ActivityConfig) -> Self {
        Self::default()
            .with_base_url(config.api_base_url.clone())
            .with_timeout(config.timeout_secs)
            .with_max_retries(config.max_retries)
            .with_token(config.token())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}
