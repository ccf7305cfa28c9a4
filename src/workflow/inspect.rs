//! Checks that a workflow publishes the activity page correctly

use crate::workflow::{pins::GH_PAGES_ACTION, PinSet, Workflow, WorkflowStep};
use serde::Serialize;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// One inspection check
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, detail: detail.into() }
    }

    fn warn(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Warn, detail: detail.into() }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, detail: detail.into() }
    }
}

/// What the workflow is expected to do
#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Branch whose pushes must trigger the workflow
    pub branch: String,

    /// Directory the gather step writes and the deploy step publishes
    pub output_dir: String,

    /// Secret holding the API token
    pub token_secret: String,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            output_dir: "./public".to_string(),
            token_secret: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// Result of inspecting a workflow
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub workflow_name: Option<String>,
    pub pin_set: Option<PinSet>,
    pub checks: Vec<Check>,
}

impl InspectionReport {
    /// True when no check failed
    pub fn passed(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.name == name)
    }
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn normalize_dir(dir: &str) -> &str {
    let dir = dir.trim();
    let dir = dir.strip_prefix("./").unwrap_or(dir);
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() {
        "."
    } else {
        trimmed
    }
}

fn references_secret(value: &str, secret: &str) -> bool {
    compact(value) == format!("${{{{secrets.{}}}}}", secret)
}

fn is_deploy(step: &WorkflowStep) -> bool {
    step.uses_action(GH_PAGES_ACTION)
}

/// Inspect a workflow against the expected publishing setup
pub fn inspect(workflow: &Workflow, options: &InspectOptions) -> InspectionReport {
    let mut checks = Vec::new();
    let triggers = &workflow.triggers;

    checks.push(if triggers.manual_dispatch {
        Check::pass("manual-dispatch", "workflow_dispatch is enabled")
    } else {
        Check::warn("manual-dispatch", "no workflow_dispatch trigger; runs cannot be started by hand")
    });

    checks.push(if let Some(daily) = triggers.schedules.iter().find(|s| s.is_daily_at(0, 0)) {
        Check::pass("daily-schedule", format!("'{}' runs daily at 00:00 UTC", daily))
    } else if let Some(other) = triggers.schedules.first() {
        Check::warn("daily-schedule", format!("scheduled with '{}', not daily at midnight UTC", other))
    } else {
        Check::fail("daily-schedule", "no schedule trigger")
    });

    checks.push(if triggers.on_push_to(&options.branch) {
        Check::pass("push-trigger", format!("pushes to {} trigger the workflow", options.branch))
    } else {
        Check::fail("push-trigger", format!("pushes to {} do not trigger the workflow", options.branch))
    });

    let deploy = workflow.steps().find(|(_, _, step)| is_deploy(step));
    let gather = workflow.steps().find(|(_, _, step)| {
        step.run.is_some()
            && step
                .env
                .get(&options.token_secret)
                .is_some_and(|v| references_secret(v, &options.token_secret))
    });

    checks.push(match gather {
        Some((_, _, step)) => Check::pass(
            "gather-token",
            format!("'{}' receives {}", step.label(), options.token_secret),
        ),
        None => Check::fail(
            "gather-token",
            format!(
                "no run step receives {} from secrets.{}",
                options.token_secret, options.token_secret
            ),
        ),
    });

    match deploy {
        None => checks.push(Check::fail("deploy", format!("no {} step", GH_PAGES_ACTION))),
        Some((deploy_job, deploy_index, step)) => {
            checks.push(
                match step.with.get("github_token") {
                    Some(token) if references_secret(token, &options.token_secret) => {
                        Check::pass("deploy-token", format!("deploy uses secrets.{}", options.token_secret))
                    }
                    Some(token) => Check::fail("deploy-token", format!("deploy uses unexpected token '{}'", token)),
                    None => Check::fail("deploy-token", "deploy step has no github_token"),
                },
            );

            checks.push(match step.with.get("publish_dir") {
                Some(dir) if normalize_dir(dir) == normalize_dir(&options.output_dir) => {
                    Check::pass("publish-dir", format!("publishes {}", dir))
                }
                Some(dir) => Check::fail(
                    "publish-dir",
                    format!("publishes {} but the report is written to {}", dir, options.output_dir),
                ),
                None => Check::fail("publish-dir", "deploy step has no publish_dir"),
            });

            if let Some((gather_job, gather_index, _)) = gather {
                checks.push(if gather_job == deploy_job && gather_index < deploy_index {
                    Check::pass("step-order", "gather runs before deploy")
                } else {
                    Check::fail("step-order", "gather must run before deploy in the same job")
                });
            }
        }
    }

    let pin_set = PinSet::detect(workflow);
    checks.push(match pin_set {
        Some(set) => Check::pass("pins", format!("actions match the {} pin set", set)),
        None => {
            let actions: Vec<String> = workflow.actions().iter().map(|a| a.to_string()).collect();
            Check::warn(
                "pins",
                format!("actions match no known pin set: {}", actions.join(", ")),
            )
        }
    });

    InspectionReport {
        workflow_name: workflow.name.clone(),
        pin_set,
        checks,
    }
}
