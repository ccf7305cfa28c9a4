//! Test utilities for fork-activity

#![allow(dead_code)]

use async_trait::async_trait;
use fork_activity::core::{CommitSummary, Fork, ForkActivity, Owner, RepoRef};
use fork_activity::execution::{ActivityCrawler, CrawlEvent, CrawlOptions};
use fork_activity::github::{GitHubApi, GitHubError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Build a fork record the way the forks endpoint returns it
pub fn fork(full_name: &str) -> Fork {
    let (owner, name) = full_name
        .split_once('/')
        .expect("fork names are owner/name");
    Fork {
        name: name.to_string(),
        full_name: full_name.to_string(),
        owner: Owner {
            login: owner.to_string(),
        },
        html_url: Some(format!("https://github.com/{}", full_name)),
        stargazers_count: 0,
        pushed_at: None,
    }
}

/// In-memory fork tree standing in for the GitHub API
#[derive(Default)]
pub struct MockGitHub {
    forks: HashMap<String, Vec<Fork>>,
    commits: HashMap<String, usize>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `child` as a fork of `parent` with `commits` commits on
    /// its first page
    pub fn fork(mut self, parent: &str, child: &str, commits: usize) -> Self {
        self.forks
            .entry(parent.to_string())
            .or_default()
            .push(fork(child));
        self.commits.insert(child.to_string(), commits);
        self
    }

    /// Every request touching `full_name` fails with 404
    pub fn failing(mut self, full_name: &str) -> Self {
        self.failing.insert(full_name.to_string());
        self
    }

    /// Hold every request for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests made so far, as `forks:owner/name` or `commits:owner/name`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Highest number of requests that were in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: String, repo: &RepoRef) -> Result<(), GitHubError> {
        self.calls.lock().unwrap().push(call);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&repo.full_name()) {
            return Err(GitHubError::NotFound(format!(
                "https://api.github.com/repos/{}",
                repo
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn list_forks(&self, repo: &RepoRef, _per_page: u32) -> Result<Vec<Fork>, GitHubError> {
        self.enter(format!("forks:{}", repo), repo).await?;
        Ok(self
            .forks
            .get(&repo.full_name())
            .cloned()
            .unwrap_or_default())
    }

    async fn recent_commits(&self, repo: &RepoRef) -> Result<Vec<CommitSummary>, GitHubError> {
        self.enter(format!("commits:{}", repo), repo).await?;
        let count = self.commits.get(&repo.full_name()).copied().unwrap_or(0);
        Ok((0..count)
            .map(|i| CommitSummary {
                sha: format!("{:040x}", i),
                html_url: None,
            })
            .collect())
    }
}

/// The source repository every scenario starts from
pub fn source() -> RepoRef {
    RepoRef::new("origin", "project")
}

/// Crawl `api` from [`source`] and collect the emitted events
pub async fn crawl(
    api: Arc<MockGitHub>,
    options: CrawlOptions,
) -> (Result<Vec<ForkActivity>, GitHubError>, Vec<CrawlEvent>) {
    let crawler = ActivityCrawler::with_shared(api, options);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    crawler.add_event_handler(move |event| sink.lock().unwrap().push(event));

    let result = crawler.gather(&source()).await;
    let events = events.lock().unwrap().clone();
    (result, events)
}

pub fn names(activity: &[ForkActivity]) -> Vec<&str> {
    activity.iter().map(|a| a.fork.full_name.as_str()).collect()
}

/// Assert the crawl succeeded and return its activity
pub fn assert_crawl_ok(
    result: Result<Vec<ForkActivity>, GitHubError>,
) -> Vec<ForkActivity> {
    match result {
        Ok(activity) => activity,
        Err(e) => panic!("Expected crawl to succeed, got: {}", e),
    }
}
