//! Repository and fork models

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a repository by owner and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an `owner/name` string
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/');
        let owner = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();

        if owner.is_empty() || name.is_empty() || parts.next().is_some() {
            anyhow::bail!("Invalid repository '{}': expected 'owner/name'", s);
        }

        Ok(Self::new(owner, name))
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Owner of a repository as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// A fork as returned by the forks endpoint
///
/// Only the fields used for the report are kept; the rest of the
/// payload is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fork {
    pub name: String,
    pub full_name: String,
    pub owner: Owner,

    #[serde(default)]
    pub html_url: Option<String>,

    #[serde(default)]
    pub stargazers_count: u64,

    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl Fork {
    /// Repository reference for walking into this fork's own forks
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(self.owner.login.clone(), self.name.clone())
    }
}

/// A commit entry from the commits endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,

    #[serde(default)]
    pub html_url: Option<String>,
}
