//! Gather configuration from YAML

use crate::core::RepoRef;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Deepest fork level the crawler will walk
pub const MAX_SUPPORTED_DEPTH: usize = 10;

/// Largest page size the API accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "fork-activity.yaml";

/// Configuration for a gather run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Source repository as `owner/name`
    pub repository: String,

    /// Deepest fork level to walk (0 = direct forks only)
    pub max_depth: usize,

    /// Directory the static site is written to
    pub output_dir: PathBuf,

    /// Page title and heading
    pub title: String,

    /// Name of the environment variable holding the API token
    pub token_env: String,

    /// API base URL
    pub api_base_url: String,

    /// Page size for list requests
    pub per_page: u32,

    /// Maximum number of concurrent API requests
    pub concurrency: usize,

    /// Retries for server errors
    pub max_retries: usize,

    /// Request timeout (in seconds)
    pub timeout_secs: u64,

    /// Also write `activity.json` next to `index.html`
    pub write_json: bool,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            repository: "NomisCZ/hlstatsx-community-edition".to_string(),
            max_depth: 2,
            output_dir: PathBuf::from("public"),
            title: "Fork Activity".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            per_page: MAX_PER_PAGE,
            concurrency: 1,
            max_retries: 2,
            timeout_secs: 30,
            write_json: true,
        }
    }
}

impl ActivityConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Load the given file, else [`DEFAULT_CONFIG_FILE`] if it exists,
    /// else the built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ActivityConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        RepoRef::parse(&self.repository)?;

        if self.max_depth > MAX_SUPPORTED_DEPTH {
            anyhow::bail!(
                "max_depth {} exceeds the supported maximum of {}",
                self.max_depth,
                MAX_SUPPORTED_DEPTH
            );
        }

        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            anyhow::bail!("per_page must be between 1 and {}, got {}", MAX_PER_PAGE, self.per_page);
        }

        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }

        if self.output_dir.as_os_str().is_empty() {
            anyhow::bail!("output_dir must not be empty");
        }

        if self.token_env.trim().is_empty() {
            anyhow::bail!("token_env must name an environment variable");
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            anyhow::bail!("api_base_url must be an http(s) URL: {}", self.api_base_url);
        }

        Ok(())
    }

    /// Parsed source repository
    pub fn repo_ref(&self) -> Result<RepoRef> {
        RepoRef::parse(&self.repository)
    }

    /// Read the API token from the configured environment variable.
    ///
    /// An unset or empty variable means unauthenticated requests.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}
