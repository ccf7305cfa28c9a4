//! Writes the static site directory

use crate::core::{config::ActivityConfig, ActivityReport};
use crate::report::html::render_html;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes `index.html` (and optionally `activity.json`) into the output directory
#[derive(Debug, Clone)]
pub struct SiteWriter {
    output_dir: PathBuf,
    title: String,
    write_json: bool,
}

impl SiteWriter {
    pub fn new(output_dir: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            title: title.into(),
            write_json: false,
        }
    }

    pub fn from_config(config: &ActivityConfig) -> Self {
        Self::new(config.output_dir.clone(), config.title.clone()).with_json(config.write_json)
    }

    pub fn with_json(mut self, write_json: bool) -> Self {
        self.write_json = write_json;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the site and return the paths written
    pub fn write(&self, report: &ActivityReport) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;

        let mut written = Vec::new();

        let index = self.output_dir.join("index.html");
        std::fs::write(&index, render_html(report, &self.title))
            .with_context(|| format!("Failed to write {}", index.display()))?;
        debug!("Wrote {}", index.display());
        written.push(index);

        if self.write_json {
            let json_path = self.output_dir.join("activity.json");
            let json = serde_json::to_string_pretty(report)?;
            std::fs::write(&json_path, json)
                .with_context(|| format!("Failed to write {}", json_path.display()))?;
            debug!("Wrote {}", json_path.display());
            written.push(json_path);
        }

        info!(
            "Published {} forks to {}",
            report.forks.len(),
            self.output_dir.display()
        );

        Ok(written)
    }
}
