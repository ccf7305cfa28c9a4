//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{GatherCommand, HistoryCommand, ValidateCommand, WorkflowCommand};
use std::ffi::OsString;

/// Fork activity gatherer
#[derive(Debug, Parser, Clone)]
#[command(name = "fork-activity")]
#[command(author = "Fork Activity Contributors")]
#[command(version)]
#[command(about = "Gathers fork activity for a GitHub repository and publishes it as a static page", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to gather configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Crawl forks and write the activity page
    Gather(GatherCommand),

    /// Validate a gather configuration
    Validate(ValidateCommand),

    /// Inspect or render the publishing workflow
    #[command(subcommand)]
    Workflow(WorkflowCommand),

    /// Show gather run history
    History(HistoryCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
