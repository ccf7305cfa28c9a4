//! Test: Failure handling - API errors abort the crawl and fail the run

use crate::helpers::*;
use fork_activity::core::RunStatus;
use fork_activity::execution::{ActivityCrawler, CrawlEvent, CrawlOptions, GatherRunner};
use fork_activity::github::GitHubError;
use fork_activity::persistence::{InMemoryPersistence, PersistenceBackend};
use fork_activity::report::SiteWriter;
use std::sync::Arc;

#[tokio::test]
async fn test_commit_lookup_failure_aborts_crawl() {
    let api = Arc::new(
        MockGitHub::new()
            .fork("origin/project", "alice/project", 2)
            .fork("origin/project", "gone/project", 1)
            .fork("origin/project", "carol/project", 3)
            .failing("gone/project"),
    );

    let (result, events) = crawl(api.clone(), CrawlOptions::default()).await;

    match result {
        Err(GitHubError::NotFound(url)) => assert!(url.contains("gone/project")),
        other => panic!("Expected NotFound, got {:?}", other.map(|a| a.len())),
    }
    // Nothing after the failure is requested
    assert!(!api.calls().contains(&"commits:carol/project".to_string()));
    assert!(!events
        .iter()
        .any(|e| matches!(e, CrawlEvent::CrawlCompleted { .. })));
}

#[tokio::test]
async fn test_missing_source_fails_run() {
    let api = MockGitHub::new().failing("origin/project");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("public");

    let runner = GatherRunner::new(
        ActivityCrawler::new(api, CrawlOptions::default()),
        SiteWriter::new(&out, "Fork Activity"),
    );
    let outcome = runner.run(&source()).await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.state.status, RunStatus::Failed);
    assert!(outcome.state.completed_at.is_some());
    assert!(outcome
        .state
        .error
        .as_deref()
        .unwrap()
        .contains("Not found"));
    assert!(outcome.report.is_none());
    assert!(outcome.written.is_empty());
    assert!(!out.exists(), "no page is published for a failed crawl");
}

#[tokio::test]
async fn test_failed_run_is_recorded() {
    let api = MockGitHub::new().failing("origin/project");
    let dir = tempfile::tempdir().unwrap();
    let runner = GatherRunner::new(
        ActivityCrawler::new(api, CrawlOptions::default()),
        SiteWriter::new(dir.path(), "Fork Activity"),
    );

    let outcome = runner.run(&source()).await;
    let store = InMemoryPersistence::new();
    store.save_run(&outcome.summary()).await.unwrap();

    let runs = store.list_runs("origin/project").await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert_eq!(runs[0].active_forks, 0);
    assert!(runs[0].error.is_some());
}

#[tokio::test]
async fn test_unwritable_output_fails_run() {
    let api = MockGitHub::new().fork("origin/project", "alice/project", 2);
    let dir = tempfile::tempdir().unwrap();
    // A file where the output directory should go
    let blocked = dir.path().join("public");
    std::fs::write(&blocked, "not a directory").unwrap();

    let runner = GatherRunner::new(
        ActivityCrawler::new(api, CrawlOptions::default()),
        SiteWriter::new(&blocked, "Fork Activity"),
    );
    let outcome = runner.run(&source()).await;

    assert_eq!(outcome.state.status, RunStatus::Failed);
    assert!(outcome.report.is_some(), "crawl result is kept");
    assert_eq!(outcome.summary().active_forks, 1);
}
