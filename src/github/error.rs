//! GitHub API error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error types for GitHub API operations
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error ({status}) for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Rate limit exceeded{}", reset_at.map(|t| format!(", resets at {}", t.to_rfc3339())).unwrap_or_default())]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid API token: {0}")]
    InvalidToken(String),
}

impl GitHubError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GitHubError::Http(e) => e.is_timeout() || e.is_connect(),
            GitHubError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
