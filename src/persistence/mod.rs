//! Persistence layer for gather run history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

pub use crate::core::RunStatus;
use crate::core::{ActivityReport, RepoRef, RunState};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Summary of a gather run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// Source repository (`owner/name`)
    pub repository: String,

    pub status: RunStatus,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (if finished)
    pub completed_at: Option<DateTime<Utc>>,

    /// Number of active forks in the report
    pub active_forks: usize,

    /// Sum of first-page commit counts over all active forks
    pub total_commits: usize,

    /// Error message for failed runs
    pub error: Option<String>,
}

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save a run
    async fn save_run(&self, run: &RunSummary) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>>;

    /// List all runs for a repository, newest first
    async fn list_runs(&self, repository: &str) -> Result<Vec<RunSummary>>;

    /// List all repositories with recorded runs
    async fn list_repositories(&self) -> Result<Vec<String>>;
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryPersistence {
    runs: tokio::sync::RwLock<std::collections::HashMap<Uuid, RunSummary>>,
    by_repository: tokio::sync::RwLock<std::collections::HashMap<String, Vec<Uuid>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            runs: tokio::sync::RwLock::new(std::collections::HashMap::new()),
            by_repository: tokio::sync::RwLock::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        let mut runs = self.runs.write().await;
        let replaced = runs.insert(run.run_id, run.clone()).is_some();

        if !replaced {
            let mut by_repository = self.by_repository.write().await;
            by_repository
                .entry(run.repository.clone())
                .or_default()
                .push(run.run_id);
        }

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let runs = self.runs.read().await;
        Ok(runs.get(&run_id).cloned())
    }

    async fn list_runs(&self, repository: &str) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let by_repository = self.by_repository.read().await;

        let mut result: Vec<RunSummary> = by_repository
            .get(repository)
            .map(|ids| ids.iter().filter_map(|id| runs.get(id).cloned()).collect())
            .unwrap_or_default();
        result.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        Ok(result)
    }

    async fn list_repositories(&self) -> Result<Vec<String>> {
        let by_repository = self.by_repository.read().await;
        let mut names: Vec<String> = by_repository.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Create a summary from a finished run
pub fn create_summary(
    source: &RepoRef,
    state: &RunState,
    report: Option<&ActivityReport>,
) -> RunSummary {
    RunSummary {
        run_id: state.run_id,
        repository: source.full_name(),
        status: state.status,
        started_at: state.started_at.unwrap_or_else(Utc::now),
        completed_at: state.completed_at,
        active_forks: report.map(|r| r.forks.len()).unwrap_or(0),
        total_commits: report.map(|r| r.total_commits()).unwrap_or(0),
        error: state.error.clone(),
    }
}

/// Save a run to history, logging a warning instead of failing.
///
/// Returns whether the run was saved.
pub async fn record_run(backend: Option<&dyn PersistenceBackend>, summary: &RunSummary) -> bool {
    let Some(backend) = backend else {
        return false;
    };
    match backend.save_run(summary).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save run {} to history: {:#}", summary.run_id, e);
            false
        }
    }
}
