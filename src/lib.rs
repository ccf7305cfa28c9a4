//! fork-activity - gathers fork activity for a GitHub repository and
//! publishes it as a static page

pub mod cli;
pub mod core;
pub mod execution;
pub mod github;
pub mod persistence;
pub mod report;
pub mod workflow;

// Re-export commonly used types
pub use core::{ActivityReport, CommitSummary, Fork, ForkActivity, RepoRef, RunState, RunStatus};
pub use core::config::ActivityConfig;
pub use execution::{ActivityCrawler, CrawlEvent, CrawlOptions, GatherOutcome, GatherRunner};
pub use github::{GitHubApi, GitHubClient, GitHubClientConfig, GitHubError};
pub use report::SiteWriter;
pub use workflow::{PinSet, Workflow};
