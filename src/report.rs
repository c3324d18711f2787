//! Markdown report rendering from a persisted store.
//!
//! The report is recomputed in full from the store on every run: a dated
//! header, an optional stars badge, a table of contents, then one table per
//! topic with the newest papers first.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::paper::WebRecord;
use crate::store::{PaperStore, StoreError, TopicPapers};

/// Section and column headings of the report.
///
/// Configured under `report_labels`; any omitted heading keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportLabels {
    /// Table of contents heading.
    pub contents: String,
    /// Column headings, in table order.
    pub date: String,
    pub title: String,
    pub authors: String,
    pub domains: String,
    pub paper: String,
    pub code: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            contents: "Contents".to_string(),
            date: "Date".to_string(),
            title: "Title".to_string(),
            authors: "Authors".to_string(),
            domains: "Domains".to_string(),
            paper: "Paper".to_string(),
            code: "Code".to_string(),
        }
    }
}

impl ReportLabels {
    /// Every heading paired with its config key.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("contents", self.contents.as_str()),
            ("date", self.date.as_str()),
            ("title", self.title.as_str()),
            ("authors", self.authors.as_str()),
            ("domains", self.domains.as_str()),
            ("paper", self.paper.as_str()),
            ("code", self.code.as_str()),
        ]
    }

    fn columns(&self) -> [&str; 6] {
        [
            self.date.as_str(),
            self.title.as_str(),
            self.authors.as_str(),
            self.domains.as_str(),
            self.paper.as_str(),
            self.code.as_str(),
        ]
    }

    /// Heading row plus a rule row as wide as each padded heading.
    fn table_header(&self) -> String {
        let columns = self.columns();
        let rules: Vec<String> = columns
            .iter()
            .map(|name| "-".repeat(name.chars().count().max(3) + 2))
            .collect();
        format!("| {} |\n|{}|\n", columns.join(" | "), rules.join("|"))
    }
}

/// Presentation settings for a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Heading text; the render date is appended.
    pub title: String,
    /// Emit the stars badge line.
    pub show_badge: bool,
    /// `owner/name` the badge points at.
    pub badge_repo: Option<String>,
    /// Code cell text for papers without a code link.
    pub no_code_marker: String,
    /// Headings.
    pub labels: ReportLabels,
}

impl From<&Config> for ReportOptions {
    fn from(config: &Config) -> Self {
        Self {
            title: config.report_title.clone(),
            show_badge: config.show_badge,
            badge_repo: config.badge_repo.clone(),
            no_code_marker: config.no_code_marker.clone(),
            labels: config.report_labels.clone(),
        }
    }
}

/// Anchor GitHub generates for a `####` heading: lowercased, spaces to hyphens.
#[must_use]
pub fn topic_anchor(topic: &str) -> String {
    topic.to_lowercase().replace(' ', "-")
}

/// Keeps user text from breaking out of a table cell.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Rows of one topic, newest first; equal dates keep identifier order.
fn sorted_rows(papers: &TopicPapers, no_code_marker: &str) -> Vec<WebRecord> {
    let mut rows: Vec<WebRecord> = papers
        .values()
        .map(|record| WebRecord::from_record(record, no_code_marker))
        .collect();
    rows.sort_by(|a, b| b.published.cmp(&a.published));
    rows
}

/// Renders the whole report as Markdown.
#[must_use]
pub fn render_markdown(store: &PaperStore, options: &ReportOptions, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {} - {}\n", options.title, today.format("%Y-%m-%d"));

    if options.show_badge {
        match options.badge_repo.as_deref() {
            Some(repo) => {
                let _ = writeln!(
                    out,
                    "[![GitHub stars](https://img.shields.io/github/stars/{repo}?style=social)](https://github.com/{repo})\n"
                );
            }
            None => warn!("show_badge is set but badge_repo is not configured; skipping badge"),
        }
    }

    let _ = writeln!(out, "### {}", options.labels.contents);
    for topic in store.topics().keys() {
        let _ = writeln!(out, "- [{topic}](#{})", topic_anchor(topic));
    }

    let table_header = options.labels.table_header();
    for (topic, papers) in store.topics() {
        let _ = writeln!(out, "\n#### {topic}");
        out.push_str(&table_header);
        for row in sorted_rows(papers, &options.no_code_marker) {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                row.published,
                escape_cell(&row.title),
                escape_cell(&row.authors),
                escape_cell(&row.domains),
                row.paper_link,
                escape_cell(&row.code_link),
            );
        }
    }
    out
}

/// Renders the store at `store_path` into `output_path`, dated today.
///
/// # Errors
///
/// Returns [`StoreError`] when the store cannot be read or the report written.
#[instrument(skip(options), fields(store = %store_path.display(), output = %output_path.display()))]
pub fn render_file(
    store_path: &Path,
    output_path: &Path,
    options: &ReportOptions,
) -> Result<(), StoreError> {
    let store = PaperStore::load(store_path)?;
    let markdown = render_markdown(&store, options, Local::now().date_naive());

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    }
    fs::write(output_path, markdown).map_err(|err| StoreError::io(output_path, err))?;
    info!(topics = store.topics().len(), "Report written");
    Ok(())
}
