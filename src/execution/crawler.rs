//! Fork crawler - walks the fork tree and records active forks

use crate::{
    core::{config::ActivityConfig, Fork, ForkActivity, RepoRef},
    github::{GitHubApi, GitHubError},
};
use futures::future::{try_join_all, BoxFuture};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info};

/// Events that can occur during a crawl
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    CrawlStarted {
        source: RepoRef,
        max_depth: usize,
    },
    ForksListed {
        repo: RepoRef,
        depth: usize,
        count: usize,
    },
    ForkActive {
        full_name: String,
        commits: usize,
        depth: usize,
    },
    ForkInactive {
        full_name: String,
        depth: usize,
    },
    CrawlCompleted {
        source: RepoRef,
        active_forks: usize,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

/// Limits for a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Deepest level whose forks are listed (0 = direct forks only)
    pub max_depth: usize,

    /// Page size for fork listings
    pub per_page: u32,

    /// Maximum number of API calls in flight
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 2,
            per_page: 100,
            concurrency: 1,
        }
    }
}

impl From<&ActivityConfig> for CrawlOptions {
    fn from(config: &ActivityConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            per_page: config.per_page,
            concurrency: config.concurrency.max(1),
        }
    }
}

/// Crawls the fork tree of a repository
pub struct ActivityCrawler<G> {
    api: Arc<G>,
    options: CrawlOptions,
    permits: Semaphore,
    event_handlers: Mutex<Vec<EventHandler>>,
}

impl<G: GitHubApi + 'static> ActivityCrawler<G> {
    pub fn new(api: G, options: CrawlOptions) -> Self {
        Self::with_shared(Arc::new(api), options)
    }

    /// Create a crawler over an API handle that is also used elsewhere
    pub fn with_shared(api: Arc<G>, options: CrawlOptions) -> Self {
        let permits = Semaphore::new(options.concurrency.max(1));
        Self {
            api,
            options,
            permits,
            event_handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(CrawlEvent) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.event_handlers.lock() {
            handlers.push(Arc::new(handler));
        }
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: CrawlEvent) {
        let handlers = match self.event_handlers.lock() {
            Ok(handlers) => handlers.clone(),
            Err(_) => return,
        };
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Gather activity for every fork reachable from `source`.
    ///
    /// Results are in depth-first pre-order: each active fork is followed
    /// by the active forks found beneath it. Forks without commits are
    /// dropped together with their subtree.
    pub async fn gather(&self, source: &RepoRef) -> Result<Vec<ForkActivity>, GitHubError> {
        info!(
            "Gathering fork activity for {} (max depth {})",
            source, self.options.max_depth
        );
        self.emit_event(CrawlEvent::CrawlStarted {
            source: source.clone(),
            max_depth: self.options.max_depth,
        });

        let activity = self.gather_level(source.clone(), 0).await?;

        info!("Found {} active forks of {}", activity.len(), source);
        self.emit_event(CrawlEvent::CrawlCompleted {
            source: source.clone(),
            active_forks: activity.len(),
        });

        Ok(activity)
    }

    fn gather_level(
        &self,
        repo: RepoRef,
        depth: usize,
    ) -> BoxFuture<'_, Result<Vec<ForkActivity>, GitHubError>> {
        Box::pin(async move {
            if depth > self.options.max_depth {
                return Ok(Vec::new());
            }

            let forks = {
                let _permit = self.acquire().await;
                self.api.list_forks(&repo, self.options.per_page).await?
            };
            debug!("{} has {} forks at depth {}", repo, forks.len(), depth);
            self.emit_event(CrawlEvent::ForksListed {
                repo: repo.clone(),
                depth,
                count: forks.len(),
            });

            let subtrees = if self.options.concurrency > 1 {
                try_join_all(forks.into_iter().map(|fork| self.gather_fork(fork, depth))).await?
            } else {
                let mut subtrees = Vec::with_capacity(forks.len());
                for fork in forks {
                    subtrees.push(self.gather_fork(fork, depth).await?);
                }
                subtrees
            };

            Ok(subtrees.into_iter().flatten().collect())
        })
    }

    async fn gather_fork(
        &self,
        fork: Fork,
        depth: usize,
    ) -> Result<Vec<ForkActivity>, GitHubError> {
        let repo = fork.repo_ref();
        let commits = {
            let _permit = self.acquire().await;
            self.api.recent_commits(&repo).await?
        };

        if commits.is_empty() {
            debug!("Skipping {}: no commits", fork.full_name);
            self.emit_event(CrawlEvent::ForkInactive {
                full_name: fork.full_name.clone(),
                depth,
            });
            return Ok(Vec::new());
        }

        self.emit_event(CrawlEvent::ForkActive {
            full_name: fork.full_name.clone(),
            commits: commits.len(),
            depth,
        });

        let mut activity = vec![ForkActivity {
            fork,
            commits: commits.len(),
            depth,
        }];
        activity.extend(self.gather_level(repo, depth + 1).await?);

        Ok(activity)
    }

    async fn acquire(&self) -> Option<SemaphorePermit<'_>> {
        // The semaphore is never closed
        self.permits.acquire().await.ok()
    }
}
