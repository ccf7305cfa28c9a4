//! CLI command definitions

use crate::core::config::ActivityConfig;
use crate::workflow::{PinSet, RenderOptions};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Crawl forks and write the activity page
#[derive(Debug, Args, Clone)]
pub struct GatherCommand {
    /// Source repository (owner/name)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Deepest fork level to walk
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Output directory for the site
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum concurrent API requests
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Environment variable holding the API token
    #[arg(long)]
    pub token_env: Option<String>,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl GatherCommand {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut ActivityConfig) {
        if let Some(repo) = &self.repo {
            config.repository = repo.clone();
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(token_env) = &self.token_env {
            config.token_env = token_env.clone();
        }
    }
}

/// Validate a gather configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Workflow subcommands
#[derive(Debug, Subcommand, Clone)]
pub enum WorkflowCommand {
    /// Check a workflow file's triggers, token wiring and pins
    Inspect(InspectCommand),

    /// Write a publishing workflow for this tool
    Render(RenderCommand),

    /// Show upcoming scheduled runs
    NextRuns(NextRunsCommand),
}

/// Check a workflow file
#[derive(Debug, Args, Clone)]
pub struct InspectCommand {
    /// Path to workflow YAML file
    pub file: PathBuf,

    /// Branch whose pushes should trigger the workflow
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Directory the deploy step should publish
    #[arg(long, default_value = "./public")]
    pub output_dir: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Render a workflow
#[derive(Debug, Args, Clone)]
pub struct RenderCommand {
    /// Action pin set
    #[arg(long, value_enum, default_value_t = PinSet::Current)]
    pub pins: PinSet,

    /// Branch whose pushes trigger the workflow
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Cron schedule (UTC)
    #[arg(long, default_value = "0 0 * * *")]
    pub cron: String,

    /// Directory to publish
    #[arg(long, default_value = "./public")]
    pub output_dir: String,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions {
            pins: self.pins,
            branch: self.branch.clone(),
            cron: self.cron.clone(),
            output_dir: self.output_dir.clone(),
            ..Default::default()
        }
    }
}

/// Show upcoming scheduled runs
#[derive(Debug, Args, Clone)]
pub struct NextRunsCommand {
    /// Path to workflow YAML file
    pub file: PathBuf,

    /// Number of runs to show per schedule
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,
}

/// Show gather run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Repository to filter by (owner/name)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show a specific run
    #[arg(long)]
    pub run_id: Option<String>,
}
