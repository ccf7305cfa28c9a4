//! Known action pin sets for the publishing workflow

use crate::workflow::Workflow;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CHECKOUT_ACTION: &str = "actions/checkout";
pub const SETUP_PYTHON_ACTION: &str = "actions/setup-python";
pub const GH_PAGES_ACTION: &str = "peaceiris/actions-gh-pages";

/// Versions pinned by one variant of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pins {
    pub checkout: &'static str,
    pub setup_python: &'static str,
    pub gh_pages: &'static str,
    pub python_version: &'static str,
}

/// The two published variants of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PinSet {
    /// Major-version tags, interpreter `3.x`
    Legacy,
    /// Exact release tags, interpreter `3.13`
    Current,
}

impl PinSet {
    pub const ALL: [PinSet; 2] = [PinSet::Current, PinSet::Legacy];

    pub fn pins(self) -> Pins {
        match self {
            PinSet::Legacy => Pins {
                checkout: "v3",
                setup_python: "v4",
                gh_pages: "v3",
                python_version: "3.x",
            },
            PinSet::Current => Pins {
                checkout: "v4.2.2",
                setup_python: "v5.6.0",
                gh_pages: "v4.0.0",
                python_version: "3.13",
            },
        }
    }

    /// Which pin set the workflow uses, if any.
    ///
    /// Checkout and deploy must both be present at this set's versions;
    /// a Python setup step, when present, must match as well.
    pub fn detect(workflow: &Workflow) -> Option<PinSet> {
        Self::ALL.into_iter().find(|set| set.matches(workflow))
    }

    fn matches(self, workflow: &Workflow) -> bool {
        let pins = self.pins();
        let mut saw_checkout = false;
        let mut saw_deploy = false;

        for (_, _, step) in workflow.steps() {
            let Some(action) = step.action() else {
                continue;
            };

            let matches = match action.action.as_str() {
                CHECKOUT_ACTION => {
                    saw_checkout = true;
                    action.version == pins.checkout
                }
                GH_PAGES_ACTION => {
                    saw_deploy = true;
                    action.version == pins.gh_pages
                }
                SETUP_PYTHON_ACTION => {
                    action.version == pins.setup_python
                        && step
                            .with
                            .get("python-version")
                            .map_or(true, |v| v == pins.python_version)
                }
                _ => true,
            };

            if !matches {
                return false;
            }
        }

        saw_checkout && saw_deploy
    }
}

impl fmt::Display for PinSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinSet::Legacy => f.write_str("legacy"),
            PinSet::Current => f.write_str("current"),
        }
    }
}
