use anyhow::{Context, Result};
use chrono::Utc;
use fork_activity::cli::commands::{
    GatherCommand, HistoryCommand, InspectCommand, NextRunsCommand, RenderCommand, ValidateCommand,
    WorkflowCommand,
};
use fork_activity::cli::output::*;
use fork_activity::cli::{Cli, Command};
use fork_activity::core::config::ActivityConfig;
use fork_activity::execution::{ActivityCrawler, CrawlEvent, CrawlOptions, GatherRunner};
use fork_activity::github::{GitHubClient, GitHubClientConfig};
use fork_activity::persistence::{record_run, PersistenceBackend, RunSummary};
use fork_activity::report::SiteWriter;
use fork_activity::workflow::{self, InspectOptions, Workflow};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config_path = cli.config.as_deref().map(Path::new);

    match &cli.command {
        Command::Gather(cmd) => gather(cmd, config_path).await?,
        Command::Validate(cmd) => validate_config(cmd, config_path)?,
        Command::Workflow(WorkflowCommand::Inspect(cmd)) => inspect_workflow(cmd)?,
        Command::Workflow(WorkflowCommand::Render(cmd)) => render_workflow(cmd)?,
        Command::Workflow(WorkflowCommand::NextRuns(cmd)) => next_runs(cmd)?,
        Command::History(cmd) => show_history(cmd).await?,
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
async fn open_history() -> Result<Arc<dyn PersistenceBackend>> {
    let store = fork_activity::persistence::SqliteRunStore::with_default_path()
        .await
        .context("Failed to open run history")?;
    Ok(Arc::new(store))
}

// History does not outlive the process without sqlite
#[cfg(not(feature = "sqlite"))]
async fn open_history() -> Result<Arc<dyn PersistenceBackend>> {
    Ok(Arc::new(fork_activity::persistence::InMemoryPersistence::new()))
}

async fn gather(cmd: &GatherCommand, config_path: Option<&Path>) -> Result<()> {
    let mut config = ActivityConfig::load(config_path).context("Failed to load gather config")?;
    cmd.apply(&mut config);
    config.validate()?;

    let source = config.repo_ref()?;
    let client_config = GitHubClientConfig::from_activity_config(&config);
    if client_config.token.is_none() {
        info!(
            "{} is not set, using unauthenticated requests",
            config.token_env
        );
    }

    let client = GitHubClient::new(client_config).context("Failed to create GitHub client")?;
    let crawler = ActivityCrawler::new(client, CrawlOptions::from(&config));

    // Console progress unless stdout carries JSON
    let spinner = if cmd.json { None } else { Some(create_spinner()) };
    if let Some(spinner) = spinner.clone() {
        crawler.add_event_handler(move |event| {
            let line = format_crawl_event(&event);
            match event {
                CrawlEvent::ForkActive { .. } | CrawlEvent::CrawlStarted { .. } => {
                    spinner.println(line)
                }
                _ => spinner.set_message(line),
            }
        });
    }

    let runner = GatherRunner::new(crawler, SiteWriter::from_config(&config));
    let outcome = runner.run(&source).await;

    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    // History is skipped, not fatal, when the store cannot be opened
    let store = if cmd.no_history {
        None
    } else {
        match open_history().await {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Continuing without history: {:#}", e);
                None
            }
        }
    };
    let summary = outcome.summary();
    let saved = record_run(store.as_deref(), &summary).await;

    if cmd.json {
        let data = serde_json::json!({
            "run": summary,
            "report": outcome.report,
            "written": outcome.written,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        for path in &outcome.written {
            println!("{} Wrote {}", INFO, style(path.display()).dim());
        }
        if saved {
            println!(
                "{} Run saved to history (ID: {})",
                INFO,
                style(&summary.run_id.to_string()[..8]).dim()
            );
        }
    }

    if outcome.is_success() {
        if !cmd.json {
            println!(
                "\n{} {} - {} active forks, {} commits",
                CHECK,
                style(&source).bold(),
                style(summary.active_forks).cyan(),
                style(summary.total_commits).cyan()
            );
        }
    } else {
        if !cmd.json {
            println!("\n{} {} {}", CROSS, style(&source).bold(), style("failed").red());
        }
        error!("{}", outcome.state.error.as_deref().unwrap_or("unknown error"));
        std::process::exit(1);
    }

    Ok(())
}

fn validate_config(cmd: &ValidateCommand, config_path: Option<&Path>) -> Result<()> {
    println!("{} Validating configuration...", INFO);

    match ActivityConfig::load(config_path) {
        Ok(config) => {
            println!("{} Configuration is valid!", CHECK);
            println!("  Repository: {}", style(&config.repository).bold());
            println!("  Max depth: {}", style(config.max_depth).cyan());
            println!("  Output: {}", style(config.output_dir.display()).dim());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn inspect_workflow(cmd: &InspectCommand) -> Result<()> {
    let parsed = Workflow::from_file(&cmd.file)?;
    let options = InspectOptions {
        branch: cmd.branch.clone(),
        output_dir: cmd.output_dir.clone(),
        ..Default::default()
    };
    let report = workflow::inspect(&parsed, &options);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_inspection(&report));
    }

    if !report.passed() {
        if !cmd.json {
            println!(
                "\n{} {} checks failed",
                CROSS,
                style(report.failures().count()).red()
            );
        }
        std::process::exit(1);
    }

    Ok(())
}

fn render_workflow(cmd: &RenderCommand) -> Result<()> {
    let options = cmd.to_options();
    let schedule = workflow::CronSchedule::parse(&options.cron)
        .with_context(|| format!("Invalid cron expression '{}'", options.cron))?;
    let yaml = workflow::render(&options);

    match &cmd.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, &yaml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Wrote {} ({} pins, schedule '{}')",
                CHECK,
                style(path.display()).bold(),
                options.pins,
                schedule
            );
        }
        None => print!("{}", yaml),
    }

    Ok(())
}

fn next_runs(cmd: &NextRunsCommand) -> Result<()> {
    let parsed = Workflow::from_file(&cmd.file)?;

    if parsed.triggers.schedules.is_empty() {
        println!("{} Workflow has no schedule triggers", WARN);
        return Ok(());
    }

    let now = Utc::now();
    for schedule in &parsed.triggers.schedules {
        println!("{} {} (UTC)", INFO, style(schedule).bold());
        for at in schedule.upcoming(now, cmd.count) {
            println!("  {}", at.format("%Y-%m-%d %H:%M %a"));
        }
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = open_history().await?;

    // If a specific run ID is requested
    if let Some(run_id_str) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id_str).context("Invalid run ID format")?;

        match store.load_run(run_id).await? {
            Some(summary) => print_run_details(&summary, cmd.json)?,
            None => println!("{} Run not found", WARN),
        }
        return Ok(());
    }

    let runs: Vec<RunSummary> = if let Some(repository) = &cmd.repo {
        store.list_runs(repository).await?.into_iter().take(cmd.limit).collect()
    } else {
        let mut all_runs = Vec::new();
        for repository in store.list_repositories().await? {
            all_runs.extend(store.list_runs(&repository).await?);
        }
        all_runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        all_runs.into_iter().take(cmd.limit).collect()
    };

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Run history (showing latest {}):", INFO, cmd.limit);
    for summary in &runs {
        println!("  {}", format_run_summary(summary));
    }

    Ok(())
}

fn print_run_details(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{} Run Details", INFO);
    println!("  ID: {}", style(summary.run_id).cyan());
    println!("  Repository: {}", style(&summary.repository).bold());
    println!("  Status: {}", format_status(summary.status));
    println!("  Started: {}", style(summary.started_at.to_rfc3339()).dim());
    if let Some(completed) = summary.completed_at {
        println!("  Completed: {}", style(completed.to_rfc3339()).dim());
        if let Ok(duration) = completed.signed_duration_since(summary.started_at).to_std() {
            println!("  Duration: {}", style(format_duration(duration)).dim());
        }
    }
    println!(
        "  Activity: {} forks, {} commits",
        style(summary.active_forks).cyan(),
        style(summary.total_commits).cyan()
    );
    if let Some(error) = &summary.error {
        println!("  Error: {}", style(error).red());
    }

    Ok(())
}
