//! HTML rendering for the activity page

use crate::core::ActivityReport;

/// Escape text for use in HTML element content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render the activity page
///
/// One list item per fork, in report order: `owner/name: N commits`.
pub fn render_html(report: &ActivityReport, title: &str) -> String {
    let title = escape_html(title);

    let mut html = format!("<html><head><title>{title}</title></head><body>");
    html.push_str(&format!("<h1>{title}</h1><ul>"));
    for activity in &report.forks {
        html.push_str(&format!(
            "<li>{}: {} commits</li>",
            escape_html(&activity.fork.full_name),
            activity.commits
        ));
    }
    html.push_str("</ul></body></html>");

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fork, ForkActivity, Owner, RepoRef};

    fn report_with(names: &[(&str, usize)]) -> ActivityReport {
        let forks = names
            .iter()
            .map(|(full_name, commits)| {
                let (owner, name) = full_name.split_once('/').unwrap();
                ForkActivity {
                    fork: Fork {
                        name: name.to_string(),
                        full_name: full_name.to_string(),
                        owner: Owner { login: owner.to_string() },
                        html_url: None,
                        stargazers_count: 0,
                        pushed_at: None,
                    },
                    commits: *commits,
                    depth: 0,
                }
            })
            .collect();
        ActivityReport::from_activities(RepoRef::new("src", "repo"), 1, forks)
    }

    #[test]
    fn test_render_matches_published_layout() {
        let report = report_with(&[("alice/repo", 30), ("bob/repo", 2)]);
        let html = render_html(&report, "Fork Activity");

        assert_eq!(
            html,
            "<html><head><title>Fork Activity</title></head><body>\
             <h1>Fork Activity</h1><ul>\
             <li>alice/repo: 30 commits</li>\
             <li>bob/repo: 2 commits</li>\
             </ul></body></html>"
        );
    }

    #[test]
    fn test_render_empty_report() {
        let report = report_with(&[]);
        let html = render_html(&report, "Fork Activity");
        assert!(html.contains("<ul></ul>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let report = report_with(&[]);
        let html = render_html(&report, "Forks <of> \"R&D\"");
        assert!(html.contains("<title>Forks &lt;of&gt; &quot;R&amp;D&quot;</title>"));
    }
}
