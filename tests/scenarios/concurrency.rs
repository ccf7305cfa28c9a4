//! Test: Concurrency - bounded parallel requests, stable ordering

use crate::helpers::*;
use fork_activity::execution::CrawlOptions;
use std::sync::Arc;
use std::time::Duration;

fn wide_tree() -> MockGitHub {
    let mut api = MockGitHub::new().with_delay(Duration::from_millis(20));
    for i in 0..8 {
        let child = format!("user{}/project", i);
        api = api.fork("origin/project", &child, i + 1);
        api = api.fork(&child, &format!("sub{}/project", i), 1);
    }
    api
}

#[tokio::test]
async fn test_sequential_crawl_issues_one_request_at_a_time() {
    let api = Arc::new(wide_tree());
    let (result, _) = crawl(api.clone(), CrawlOptions::default()).await;
    assert_crawl_ok(result);

    assert_eq!(api.max_in_flight(), 1);
}

#[tokio::test]
async fn test_concurrent_crawl_respects_limit() {
    let api = Arc::new(wide_tree());
    let options = CrawlOptions {
        concurrency: 4,
        ..Default::default()
    };

    let (result, _) = crawl(api.clone(), options).await;
    assert_crawl_ok(result);

    assert!(api.max_in_flight() > 1, "requests never overlapped");
    assert!(api.max_in_flight() <= 4, "limit exceeded: {}", api.max_in_flight());
}

#[tokio::test]
async fn test_concurrent_crawl_keeps_sequential_order() {
    let sequential = {
        let (result, _) = crawl(Arc::new(wide_tree()), CrawlOptions::default()).await;
        assert_crawl_ok(result)
    };
    let concurrent = {
        let options = CrawlOptions {
            concurrency: 8,
            ..Default::default()
        };
        let (result, _) = crawl(Arc::new(wide_tree()), options).await;
        assert_crawl_ok(result)
    };

    assert_eq!(sequential.len(), 16);
    assert_eq!(names(&sequential), names(&concurrent));
    assert_eq!(names(&concurrent)[..2], ["user0/project", "sub0/project"]);
}
