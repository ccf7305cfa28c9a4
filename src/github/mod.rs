//! GitHub REST API access
//!
//! The crawler only needs two calls: list the forks of a repository and
//! fetch its recent commits. They sit behind [`GitHubApi`] so tests can
//! drive the crawler without the network.

pub mod client;
pub mod error;
pub mod pagination;

use crate::core::{CommitSummary, Fork, RepoRef};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub use client::GitHubClientConfig;
pub use error::GitHubError;

/// Trait for GitHub API access - allows for different implementations
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// List every fork of a repository, following pagination
    async fn list_forks(&self, repo: &RepoRef, per_page: u32) -> Result<Vec<Fork>, GitHubError>;

    /// Fetch the first page of a repository's commits
    async fn recent_commits(&self, repo: &RepoRef) -> Result<Vec<CommitSummary>, GitHubError>;
}

/// GitHub REST client backed by reqwest
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubClientConfig,
}

impl GitHubClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns `GitHubError` if the token cannot be sent as a header or the
    /// underlying HTTP client cannot be built.
    pub fn new(config: GitHubClientConfig) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| GitHubError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GitHubClientConfig {
        &self.config
    }

    fn repo_url(&self, repo: &RepoRef, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.base_url, repo.owner, repo.name, path
        )
    }

    /// GET a URL, retrying transient failures
    async fn get(&self, url: &str) -> Result<Response, GitHubError> {
        let mut attempt = 0;

        loop {
            let result = match self.http.get(url).send().await {
                Ok(response) => check_status(url, response).await,
                Err(e) => Err(GitHubError::from(e)),
            };

            match result {
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_backoff * attempt as u32;
                    warn!(
                        "Request to {} failed ({}), retrying in {:?} (attempt {}/{})",
                        url, e, delay, attempt, self.config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_forks(&self, repo: &RepoRef, per_page: u32) -> Result<Vec<Fork>, GitHubError> {
        let mut forks = Vec::new();
        let mut next = Some(format!("{}?per_page={}", self.repo_url(repo, "forks"), per_page));

        while let Some(url) = next {
            let response = self.get(&url).await?;
            next = pagination::next_page(response.headers());
            let page: Vec<Fork> = decode(&url, response).await?;
            debug!("Fetched {} forks of {} from {}", page.len(), repo, url);
            forks.extend(page);
        }

        Ok(forks)
    }

    async fn recent_commits(&self, repo: &RepoRef) -> Result<Vec<CommitSummary>, GitHubError> {
        let url = self.repo_url(repo, "commits");

        match self.get(&url).await {
            Ok(response) => decode(&url, response).await,
            // An empty repository has no history to list
            Err(GitHubError::Status { status: 409, .. }) => {
                debug!("{} is empty, treating as no commits", repo);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

async fn check_status(url: &str, response: Response) -> Result<Response, GitHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(GitHubError::NotFound(url.to_string()));
    }

    if (status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS)
        && rate_limit_exhausted(response.headers())
    {
        return Err(GitHubError::RateLimited {
            reset_at: rate_limit_reset(response.headers()),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(GitHubError::Status {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, GitHubError> {
    response.json::<T>().await.map_err(|e| GitHubError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    header_str(headers, "x-ratelimit-remaining").is_some_and(|v| v.trim() == "0")
}

fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    header_str(headers, "x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}
