//! GitHub Actions workflow model
//!
//! Parses the workflow that publishes the activity page so its triggers,
//! token wiring and pinned actions can be checked, and renders a fresh
//! one for this tool.

pub mod cron;
pub mod inspect;
pub mod pins;
pub mod render;

pub use cron::{CronError, CronSchedule};
pub use inspect::{inspect, Check, CheckStatus, InspectOptions, InspectionReport};
pub use pins::{PinSet, Pins};
pub use render::{render, RenderOptions};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Events that start a workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Triggers {
    /// `workflow_dispatch`
    pub manual_dispatch: bool,

    pub schedules: Vec<CronSchedule>,

    /// `push.branches` patterns, in order; `!` negates
    pub push_branches: Vec<String>,

    /// `push.branches-ignore` patterns
    pub push_branches_ignore: Vec<String>,

    /// `push` without a branch or tag filter
    pub push_any: bool,

    /// Any other event names, in declaration order
    pub other_events: Vec<String>,
}

impl Triggers {
    /// Whether a push to `branch` starts the workflow
    pub fn on_push_to(&self, branch: &str) -> bool {
        if self.push_any {
            return true;
        }
        if !self.push_branches_ignore.is_empty() {
            return !self
                .push_branches_ignore
                .iter()
                .any(|pattern| branch_matches(pattern, branch));
        }

        // Later patterns override earlier ones
        self.push_branches
            .iter()
            .fold(false, |selected, pattern| match pattern.strip_prefix('!') {
                Some(negated) if branch_matches(negated, branch) => false,
                Some(_) => selected,
                None => selected || branch_matches(pattern, branch),
            })
    }
}

/// Match a branch against a filter pattern.
///
/// `*` stays within one path segment and `**` crosses `/`; `?`, `+` and
/// `[...]` keep their regex meaning.
fn branch_matches(pattern: &str, branch: &str) -> bool {
    let mut expr = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                expr.push_str(".*");
            }
            '*' => expr.push_str("[^/]*"),
            '?' | '+' | '[' | ']' => expr.push(c),
            _ => expr.push_str(&regex::escape(&c.to_string())),
        }
    }
    expr.push('$');

    Regex::new(&expr).is_ok_and(|re| re.is_match(branch))
}

/// Reference to a reusable action, `owner/repo@version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRef {
    pub action: String,
    pub version: String,
}

impl ActionRef {
    /// Parse `owner/repo[/path]@version`
    pub fn parse(uses: &str) -> Option<Self> {
        let (action, version) = uses.trim().rsplit_once('@')?;
        if action.is_empty() || version.is_empty() || !action.contains('/') {
            return None;
        }
        Some(Self {
            action: action.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.action, self.version)
    }
}

/// A single step of a job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowStep {
    pub name: Option<String>,
    pub uses: Option<String>,
    pub run: Option<String>,
    pub with: BTreeMap<String, String>,
    pub env: BTreeMap<String, String>,
}

impl WorkflowStep {
    /// The referenced action, when `uses` names a versioned action
    pub fn action(&self) -> Option<ActionRef> {
        self.uses.as_deref().and_then(ActionRef::parse)
    }

    pub fn uses_action(&self, action: &str) -> bool {
        self.action().is_some_and(|a| a.action == action)
    }

    /// Label for output: name, else `uses`, else the first line of `run`
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.uses.clone())
            .or_else(|| self.run.as_ref().and_then(|r| r.lines().next().map(str::to_string)))
            .unwrap_or_else(|| "<unnamed step>".to_string())
    }
}

/// A job and its steps
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Job {
    pub runs_on: Option<String>,
    pub steps: Vec<WorkflowStep>,
}

/// A parsed workflow file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    pub name: Option<String>,
    pub triggers: Triggers,
    pub jobs: BTreeMap<String, Job>,
}

#[derive(Debug, Deserialize)]
struct RawWorkflow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    jobs: BTreeMap<String, RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(rename = "runs-on", default)]
    runs_on: Option<Value>,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    uses: Option<String>,
    #[serde(default)]
    run: Option<String>,
    #[serde(default)]
    with: BTreeMap<String, Value>,
    #[serde(default)]
    env: BTreeMap<String, Value>,
}

impl Workflow {
    /// Load a workflow from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read workflow {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse workflow {}", path.display()))
    }

    /// Parse a workflow from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(yaml)?;
        let Value::Mapping(map) = &root else {
            anyhow::bail!("Workflow must be a YAML mapping");
        };

        // YAML 1.1 readers turn a bare `on` key into `true`
        let on = map
            .get(&Value::String("on".to_string()))
            .or_else(|| map.get(&Value::Bool(true)))
            .context("Workflow has no 'on' section")?;
        let triggers = parse_triggers(on)?;

        let raw: RawWorkflow = serde_yaml::from_value(root.clone())?;
        let jobs = raw
            .jobs
            .into_iter()
            .map(|(id, job)| {
                let steps = job
                    .steps
                    .into_iter()
                    .map(|step| WorkflowStep {
                        name: step.name,
                        uses: step.uses,
                        run: step.run,
                        with: scalar_map(step.with),
                        env: scalar_map(step.env),
                    })
                    .collect();
                let runs_on = job.runs_on.as_ref().map(scalar_to_string);
                (id, Job { runs_on, steps })
            })
            .collect();

        Ok(Self {
            name: raw.name,
            triggers,
            jobs,
        })
    }

    /// All steps across jobs, tagged with their job id
    pub fn steps(&self) -> impl Iterator<Item = (&str, usize, &WorkflowStep)> {
        self.jobs.iter().flat_map(|(id, job)| {
            job.steps
                .iter()
                .enumerate()
                .map(move |(index, step)| (id.as_str(), index, step))
        })
    }

    /// Every versioned action referenced by the workflow
    pub fn actions(&self) -> Vec<ActionRef> {
        self.steps().filter_map(|(_, _, step)| step.action()).collect()
    }
}

fn parse_triggers(on: &Value) -> Result<Triggers> {
    let mut triggers = Triggers::default();

    match on {
        Value::String(event) => add_event(&mut triggers, event, &Value::Null)?,
        Value::Sequence(events) => {
            for event in events {
                let name = event.as_str().context("Trigger list entries must be event names")?;
                add_event(&mut triggers, name, &Value::Null)?;
            }
        }
        Value::Mapping(events) => {
            for (event, config) in events {
                let name = event.as_str().context("Trigger names must be strings")?;
                add_event(&mut triggers, name, config)?;
            }
        }
        _ => anyhow::bail!("Unsupported 'on' section"),
    }

    Ok(triggers)
}

fn add_event(triggers: &mut Triggers, name: &str, config: &Value) -> Result<()> {
    match name {
        "workflow_dispatch" => triggers.manual_dispatch = true,
        "schedule" => {
            let entries = config.as_sequence().context("'schedule' must be a list")?;
            for entry in entries {
                let expr = entry
                    .get("cron")
                    .and_then(Value::as_str)
                    .context("Schedule entries need a 'cron' expression")?;
                let schedule = CronSchedule::parse(expr)
                    .with_context(|| format!("Invalid cron expression '{}'", expr))?;
                triggers.schedules.push(schedule);
            }
        }
        "push" => {
            let branches = config.get("branches").and_then(Value::as_sequence);
            let ignored = config.get("branches-ignore").and_then(Value::as_sequence);
            if let Some(branches) = branches {
                triggers
                    .push_branches
                    .extend(branches.iter().map(scalar_to_string));
            }
            if let Some(ignored) = ignored {
                triggers
                    .push_branches_ignore
                    .extend(ignored.iter().map(scalar_to_string));
            }

            // A tag filter without a branch filter never fires for branches
            let tags_only = config.get("tags").is_some() || config.get("tags-ignore").is_some();
            if branches.is_none() && ignored.is_none() && !tags_only {
                triggers.push_any = true;
            }
        }
        other => triggers.other_events.push(other.to_string()),
    }
    Ok(())
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn scalar_map(map: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(k, v)| (k.clone(), scalar_to_string(v)))
        .collect()
}
