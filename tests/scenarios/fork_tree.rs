//! Test: Fork tree traversal - ordering, depth limits and pruning

use crate::helpers::*;
use fork_activity::core::ActivityReport;
use fork_activity::execution::{CrawlEvent, CrawlOptions};
use std::sync::Arc;

/// origin/project
/// ├── alice/project (3)
/// │   └── dave/project (2)
/// ├── bob/project (0)
/// │   └── erin/project (4)
/// └── carol/project (5)
fn mixed_tree() -> MockGitHub {
    MockGitHub::new()
        .fork("origin/project", "alice/project", 3)
        .fork("origin/project", "bob/project", 0)
        .fork("origin/project", "carol/project", 5)
        .fork("alice/project", "dave/project", 2)
        .fork("bob/project", "erin/project", 4)
}

#[tokio::test]
async fn test_depth_first_pre_order() {
    let api = Arc::new(mixed_tree());
    let (result, _) = crawl(api, CrawlOptions::default()).await;
    let activity = assert_crawl_ok(result);

    assert_eq!(
        names(&activity),
        vec!["alice/project", "dave/project", "carol/project"]
    );
    let depths: Vec<usize> = activity.iter().map(|a| a.depth).collect();
    assert_eq!(depths, vec![0, 1, 0]);
    assert_eq!(activity[0].commits, 3);
    assert_eq!(activity[1].commits, 2);
}

#[tokio::test]
async fn test_inactive_fork_subtree_is_pruned() {
    let api = Arc::new(mixed_tree());
    let (result, events) = crawl(api.clone(), CrawlOptions::default()).await;
    let activity = assert_crawl_ok(result);

    // erin has commits but sits under a fork without any
    assert!(!names(&activity).contains(&"erin/project"));
    assert!(!api.calls().contains(&"forks:bob/project".to_string()));
    assert!(!api.calls().contains(&"commits:erin/project".to_string()));

    assert!(events.iter().any(|e| matches!(
        e,
        CrawlEvent::ForkInactive { full_name, depth: 0 } if full_name == "bob/project"
    )));
}

#[tokio::test]
async fn test_max_depth_stops_listing() {
    let api = Arc::new(
        MockGitHub::new()
            .fork("origin/project", "l0/project", 1)
            .fork("l0/project", "l1/project", 1)
            .fork("l1/project", "l2/project", 1)
            .fork("l2/project", "l3/project", 1),
    );
    let options = CrawlOptions {
        max_depth: 1,
        ..Default::default()
    };

    let (result, _) = crawl(api.clone(), options).await;
    let activity = assert_crawl_ok(result);

    assert_eq!(names(&activity), vec!["l0/project", "l1/project"]);
    // Forks at the last level are checked for commits but not listed
    assert_eq!(api.call_count("forks:"), 2);
    assert_eq!(api.call_count("commits:"), 2);
}

#[tokio::test]
async fn test_source_without_forks() {
    let api = Arc::new(MockGitHub::new());
    let (result, events) = crawl(api.clone(), CrawlOptions::default()).await;

    assert!(assert_crawl_ok(result).is_empty());
    assert_eq!(api.calls(), vec!["forks:origin/project".to_string()]);
    assert!(matches!(
        events.last(),
        Some(CrawlEvent::CrawlCompleted { active_forks: 0, .. })
    ));
}

#[tokio::test]
async fn test_report_collapses_repeated_forks() {
    // shared/project is reachable through two parents
    let api = Arc::new(
        MockGitHub::new()
            .fork("origin/project", "alice/project", 1)
            .fork("origin/project", "bob/project", 1)
            .fork("alice/project", "shared/project", 7)
            .fork("bob/project", "shared/project", 7),
    );

    let (result, _) = crawl(api, CrawlOptions::default()).await;
    let activity = assert_crawl_ok(result);
    assert_eq!(activity.len(), 4);

    let report = ActivityReport::from_activities(source(), 2, activity);
    let listed: Vec<&str> = report
        .forks
        .iter()
        .map(|f| f.fork.full_name.as_str())
        .collect();
    assert_eq!(listed, vec!["alice/project", "shared/project", "bob/project"]);
    assert_eq!(report.total_commits(), 9);
}

#[tokio::test]
async fn test_forks_listed_events_carry_depth() {
    let api = Arc::new(mixed_tree());
    let (_, events) = crawl(api, CrawlOptions::default()).await;

    let listed: Vec<(String, usize, usize)> = events
        .iter()
        .filter_map(|e| match e {
            CrawlEvent::ForksListed { repo, depth, count } => {
                Some((repo.full_name(), *depth, *count))
            }
            _ => None,
        })
        .collect();

    assert_eq!(
        listed,
        vec![
            ("origin/project".to_string(), 0, 3),
            ("alice/project".to_string(), 1, 1),
            ("dave/project".to_string(), 2, 0),
            ("carol/project".to_string(), 1, 0),
        ]
    );
}
