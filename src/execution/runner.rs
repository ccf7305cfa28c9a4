//! Gather runner - one full crawl-and-publish run

use crate::{
    core::{ActivityReport, RepoRef, RunState, RunStatus},
    execution::ActivityCrawler,
    github::GitHubApi,
    persistence::{create_summary, RunSummary},
    report::SiteWriter,
};
use std::path::PathBuf;
use tracing::{error, info};

/// Result of a gather run
#[derive(Debug, Clone)]
pub struct GatherOutcome {
    pub source: RepoRef,
    pub state: RunState,

    /// Report, when the crawl succeeded
    pub report: Option<ActivityReport>,

    /// Files written to the output directory
    pub written: Vec<PathBuf>,
}

impl GatherOutcome {
    pub fn is_success(&self) -> bool {
        self.state.status == RunStatus::Completed
    }

    pub fn summary(&self) -> RunSummary {
        create_summary(&self.source, &self.state, self.report.as_ref())
    }
}

/// Crawls a repository's forks and publishes the result
pub struct GatherRunner<G> {
    crawler: ActivityCrawler<G>,
    writer: SiteWriter,
}

impl<G: GitHubApi + 'static> GatherRunner<G> {
    pub fn new(crawler: ActivityCrawler<G>, writer: SiteWriter) -> Self {
        Self { crawler, writer }
    }

    pub fn crawler(&self) -> &ActivityCrawler<G> {
        &self.crawler
    }

    /// Run the crawl and write the site.
    ///
    /// Failures are recorded in the returned state rather than returned
    /// as errors, so the caller can still persist the run.
    pub async fn run(&self, source: &RepoRef) -> GatherOutcome {
        let mut state = RunState::new();
        state.start();
        info!("Starting gather run {} for {}", state.run_id, source);

        let activity = match self.crawler.gather(source).await {
            Ok(activity) => activity,
            Err(e) => {
                error!("Crawl of {} failed: {}", source, e);
                state.fail(e.to_string());
                return GatherOutcome {
                    source: source.clone(),
                    state,
                    report: None,
                    written: Vec::new(),
                };
            }
        };

        let report = ActivityReport::from_activities(
            source.clone(),
            self.crawler.options().max_depth,
            activity,
        );

        match self.writer.write(&report) {
            Ok(written) => {
                state.complete();
                GatherOutcome {
                    source: source.clone(),
                    state,
                    report: Some(report),
                    written,
                }
            }
            Err(e) => {
                error!("Writing site to {} failed: {:#}", self.writer.output_dir().display(), e);
                state.fail(format!("{:#}", e));
                GatherOutcome {
                    source: source.clone(),
                    state,
                    report: Some(report),
                    written: Vec::new(),
                }
            }
        }
    }
}
