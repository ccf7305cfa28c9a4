//! Renders the publishing workflow for this tool

use crate::workflow::pins::{CHECKOUT_ACTION, GH_PAGES_ACTION};
use crate::workflow::PinSet;

/// Options for the rendered workflow
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub name: String,
    pub pins: PinSet,
    pub branch: String,
    pub cron: String,
    pub output_dir: String,
    pub gather_command: String,
    pub token_secret: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            name: "Gather Fork Activity".to_string(),
            pins: PinSet::Current,
            branch: "main".to_string(),
            cron: "0 0 * * *".to_string(),
            output_dir: "./public".to_string(),
            // History on a CI runner is thrown away with the runner
            gather_command: "cargo run --release -- gather --no-history".to_string(),
            token_secret: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// A YAML scalar for `value`, quoted when needed, placed at `indent`
fn scalar(value: &str, indent: usize) -> String {
    // Serializing a string cannot fail
    let yaml = serde_yaml::to_string(value).unwrap_or_default();
    yaml.trim_end_matches('\n')
        .replace('\n', &format!("\n{}", " ".repeat(indent)))
}

/// Render the workflow YAML
///
/// Every option value goes through [`scalar`], so branch globs, `#` and
/// other YAML indicators survive a round trip through the parser.
pub fn render(options: &RenderOptions) -> String {
    let pins = options.pins.pins();
    let secret = scalar(&format!("${{{{ secrets.{} }}}}", options.token_secret), 10);

    format!(
        r#"name: {name}

on:
  workflow_dispatch:
  schedule:
    - cron: {cron}
  push:
    branches:
      - {branch}

jobs:
  gather-activity:
    runs-on: ubuntu-latest
    steps:
      - name: Checkout repository
        uses: {checkout}@{checkout_version}

      - name: Gather activity data
        run: {command}
        env:
          {token_env}: {secret}

      - name: Deploy to GitHub Pages
        uses: {gh_pages}@{gh_pages_version}
        with:
          github_token: {secret}
          publish_dir: {output_dir}
"#,
        name = scalar(&options.name, 2),
        cron = scalar(&options.cron, 8),
        branch = scalar(&options.branch, 8),
        checkout = CHECKOUT_ACTION,
        checkout_version = pins.checkout,
        command = scalar(&options.gather_command, 10),
        token_env = scalar(&options.token_secret, 10),
        secret = secret,
        gh_pages = GH_PAGES_ACTION,
        gh_pages_version = pins.gh_pages,
        output_dir = scalar(&options.output_dir, 12),
    )
}
