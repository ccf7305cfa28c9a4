//! Gather execution

pub mod crawler;
pub mod runner;

pub use crawler::{ActivityCrawler, CrawlEvent, CrawlOptions, EventHandler};
pub use runner::{GatherOutcome, GatherRunner};
