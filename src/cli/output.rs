//! CLI output formatting

use crate::{
    core::RunStatus,
    execution::CrawlEvent,
    persistence::RunSummary,
    workflow::{CheckStatus, InspectionReport},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner for the crawl
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        spinner.set_style(template);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format run summary for display
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = match summary.status {
        RunStatus::Completed => CHECK,
        RunStatus::Failed => CROSS,
        RunStatus::Running => SPINNER,
        RunStatus::Pending => INFO,
    };

    format!(
        "{} {} - {} - {} - {} forks, {} commits - {}",
        status_icon,
        style(&summary.run_id.to_string()[..8]).dim(),
        style(&summary.repository).bold(),
        format_status(summary.status),
        style(summary.active_forks).cyan(),
        style(summary.total_commits).cyan(),
        style(summary.started_at.format("%Y-%m-%d %H:%M UTC")).dim()
    )
}

/// Short spinner message for a crawl event
pub fn format_crawl_event(event: &CrawlEvent) -> String {
    let indent = |depth: usize| "  ".repeat(depth);
    match event {
        CrawlEvent::CrawlStarted { source, max_depth } => format!(
            "{} Crawling forks of {} (max depth {})",
            ROCKET,
            style(source).bold(),
            max_depth
        ),
        CrawlEvent::ForksListed { repo, depth, count } => format!(
            "{}{} {} has {} forks",
            indent(*depth),
            INFO,
            style(repo).cyan(),
            count
        ),
        CrawlEvent::ForkActive {
            full_name,
            commits,
            depth,
        } => format!(
            "{}{} {} ({} commits)",
            indent(*depth),
            CHECK,
            style(full_name).green(),
            commits
        ),
        CrawlEvent::ForkInactive { full_name, depth } => format!(
            "{}{} {} (no commits)",
            indent(*depth),
            style("·").dim(),
            style(full_name).dim()
        ),
        CrawlEvent::CrawlCompleted {
            source,
            active_forks,
        } => format!(
            "{} {} active forks of {}",
            CHECK,
            style(active_forks).cyan(),
            style(source).bold()
        ),
    }
}

/// Format an inspection report for display
pub fn format_inspection(report: &InspectionReport) -> String {
    let mut lines = Vec::with_capacity(report.checks.len() + 1);
    if let Some(name) = &report.workflow_name {
        lines.push(format!("{} Workflow: {}", INFO, style(name).bold()));
    }

    for check in &report.checks {
        let (icon, name) = match check.status {
            CheckStatus::Pass => (CHECK, style(check.name).green()),
            CheckStatus::Warn => (WARN, style(check.name).yellow()),
            CheckStatus::Fail => (CROSS, style(check.name).red()),
        };
        lines.push(format!("  {}{}: {}", icon, name, style(&check.detail).dim()));
    }

    lines.join("\n")
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
