//! Test: Site output - a successful run publishes the page

use crate::helpers::*;
use fork_activity::core::{ActivityReport, RunStatus};
use fork_activity::execution::{ActivityCrawler, CrawlOptions, GatherRunner};
use fork_activity::report::SiteWriter;

#[tokio::test]
async fn test_successful_run_writes_page_and_json() {
    let api = MockGitHub::new()
        .fork("origin/project", "alice/project", 30)
        .fork("origin/project", "bob/project", 0)
        .fork("alice/project", "carol/project", 4);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("public");

    let runner = GatherRunner::new(
        ActivityCrawler::new(api, CrawlOptions::default()),
        SiteWriter::new(&out, "Fork Activity").with_json(true),
    );
    let outcome = runner.run(&source()).await;

    assert!(outcome.is_success(), "run failed: {:?}", outcome.state.error);
    assert_eq!(outcome.written.len(), 2);

    let html = std::fs::read_to_string(out.join("index.html")).unwrap();
    assert!(html.starts_with("<html><head><title>Fork Activity</title></head>"));
    assert!(html.contains(
        "<ul><li>alice/project: 30 commits</li><li>carol/project: 4 commits</li></ul>"
    ));
    assert!(!html.contains("bob/project"));

    let json = std::fs::read_to_string(out.join("activity.json")).unwrap();
    let report: ActivityReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report.source, source());
    assert_eq!(report.forks.len(), 2);
    assert_eq!(report.forks[1].depth, 1);

    let summary = outcome.summary();
    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.repository, "origin/project");
    assert_eq!(summary.active_forks, 2);
    assert_eq!(summary.total_commits, 34);
}

#[tokio::test]
async fn test_no_active_forks_still_publishes() {
    let api = MockGitHub::new().fork("origin/project", "idle/project", 0);
    let dir = tempfile::tempdir().unwrap();

    let runner = GatherRunner::new(
        ActivityCrawler::new(api, CrawlOptions::default()),
        SiteWriter::new(dir.path(), "Fork Activity"),
    );
    let outcome = runner.run(&source()).await;

    assert!(outcome.is_success());
    assert!(outcome.report.as_ref().unwrap().is_empty());
    assert_eq!(outcome.written, vec![dir.path().join("index.html")]);

    let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(html.contains("<h1>Fork Activity</h1><ul></ul>"));
}

#[tokio::test]
async fn test_rerun_overwrites_page() {
    let dir = tempfile::tempdir().unwrap();
    let writer = SiteWriter::new(dir.path(), "Fork Activity");

    let first = GatherRunner::new(
        ActivityCrawler::new(
            MockGitHub::new().fork("origin/project", "old/project", 1),
            CrawlOptions::default(),
        ),
        writer.clone(),
    );
    assert!(first.run(&source()).await.is_success());

    let second = GatherRunner::new(
        ActivityCrawler::new(
            MockGitHub::new().fork("origin/project", "new/project", 2),
            CrawlOptions::default(),
        ),
        writer,
    );
    assert!(second.run(&source()).await.is_success());

    let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(html.contains("new/project: 2 commits"));
    assert!(!html.contains("old/project"));
}
