//! Smoke test - gathers a real repository's forks end-to-end
//!
//! Talks to api.github.com, so it is ignored by default.
//! Run with: cargo test --test smoke_test -- --ignored
//! Set GITHUB_TOKEN to avoid the unauthenticated rate limit.

use fork_activity::core::config::ActivityConfig;
use fork_activity::execution::{ActivityCrawler, CrawlOptions, GatherRunner};
use fork_activity::github::{GitHubClient, GitHubClientConfig};
use fork_activity::report::SiteWriter;
use std::time::Duration;

#[tokio::test]
#[ignore] // Requires network access
async fn smoke_test_direct_forks() {
    let dir = tempfile::tempdir().unwrap();
    let config = ActivityConfig {
        max_depth: 0,
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let client = GitHubClient::new(GitHubClientConfig::from_activity_config(&config))
        .expect("Should build client");
    let runner = GatherRunner::new(
        ActivityCrawler::new(client, CrawlOptions::from(&config)),
        SiteWriter::from_config(&config),
    );

    let outcome = tokio::time::timeout(
        Duration::from_secs(120),
        runner.run(&config.repo_ref().unwrap()),
    )
    .await
    .expect("Gather should finish within 2 minutes");

    assert!(outcome.is_success(), "Run failed: {:?}", outcome.state.error);

    let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(html.contains("<h1>Fork Activity</h1>"));
    for activity in &outcome.report.unwrap().forks {
        assert!(activity.commits > 0);
        assert_eq!(activity.depth, 0);
    }
}
