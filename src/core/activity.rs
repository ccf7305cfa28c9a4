//! Gathered activity and the report built from it

use crate::core::{Fork, RepoRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fork that has commits, and where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkActivity {
    pub fork: Fork,

    /// Number of commits on the first page of the fork's history
    pub commits: usize,

    /// Depth at which the fork was discovered (0 = direct fork of the source)
    pub depth: usize,
}

/// Activity report for one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityReport {
    pub source: RepoRef,
    pub generated_at: DateTime<Utc>,
    pub max_depth: usize,
    pub forks: Vec<ForkActivity>,
}

impl ActivityReport {
    /// Build a report, collapsing entries that share a `full_name`.
    ///
    /// The first occurrence fixes the position in the list; later
    /// occurrences replace its value.
    pub fn from_activities(
        source: RepoRef,
        max_depth: usize,
        activities: Vec<ForkActivity>,
    ) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut forks: Vec<ForkActivity> = Vec::with_capacity(activities.len());

        for activity in activities {
            match index.get(&activity.fork.full_name) {
                Some(&pos) => forks[pos] = activity,
                None => {
                    index.insert(activity.fork.full_name.clone(), forks.len());
                    forks.push(activity);
                }
            }
        }

        Self {
            source,
            generated_at: Utc::now(),
            max_depth,
            forks,
        }
    }

    pub fn total_commits(&self) -> usize {
        self.forks.iter().map(|f| f.commits).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.forks.is_empty()
    }
}
