//! Paper records as persisted in the store, and their display projection.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Base URL for paper abstract pages.
pub const ARXIV_ABS_BASE_URL: &str = "https://arxiv.org/abs/";

/// Separator used when domain tags are shown as one string.
pub const DOMAIN_TAG_SEPARATOR: &str = ", ";

static VERSION_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"v\d+$"));

/// Compiles a regex from a static pattern; panics only on a programmer error.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Strips a trailing `vN` version suffix from an arXiv identifier.
///
/// Idempotent: an identifier without a suffix is returned unchanged, so
/// `2401.01234v2`, `2401.01234v3` and `2401.01234` all share one store key.
#[must_use]
pub fn dedup_identifier(source_id: &str) -> String {
    VERSION_SUFFIX_RE.replace(source_id.trim(), "").into_owned()
}

/// Absolute abstract-page link for a dedup identifier.
#[must_use]
pub fn paper_link(identifier: &str) -> String {
    format!("{ARXIV_ABS_BASE_URL}{identifier}")
}

/// One stored paper.
///
/// Field labels on disk are the store's native labels and are kept stable so
/// existing store files keep loading. A missing label reads as empty, and
/// labels this type does not know are carried in [`PaperRecord::extra`] and
/// written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Paper title.
    #[serde(rename = "标题", default)]
    pub title: String,
    /// Comma-joined author names, or the first author only.
    #[serde(rename = "作者", default)]
    pub authors: String,
    /// Abstract with newlines replaced by spaces.
    #[serde(rename = "摘要", default)]
    pub summary: String,
    /// Publication date, `YYYY-MM-DD`.
    #[serde(rename = "日期", default)]
    pub published: String,
    /// Topics whose filters match the title.
    #[serde(rename = "领域标签", default)]
    pub domain_tags: Vec<String>,
    /// Abstract page link.
    #[serde(rename = "论文链接", default)]
    pub paper_url: String,
    /// Best-match code repository, `null` when none was found.
    #[serde(rename = "代码链接", default)]
    pub code_url: Option<String>,
    /// Labels written by other tools, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Display-ready projection of a [`PaperRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebRecord {
    /// Paper title.
    pub title: String,
    /// Author string as stored.
    pub authors: String,
    /// Publication date, `YYYY-MM-DD`.
    pub published: String,
    /// Domain tags joined with [`DOMAIN_TAG_SEPARATOR`].
    pub domains: String,
    /// `[PDF](...)` Markdown link.
    pub paper_link: String,
    /// `[Code](...)` Markdown link, or the no-code marker.
    pub code_link: String,
}

impl WebRecord {
    /// Projects a stored record for rendering.
    #[must_use]
    pub fn from_record(record: &PaperRecord, no_code_marker: &str) -> Self {
        Self {
            title: record.title.clone(),
            authors: record.authors.clone(),
            published: record.published.clone(),
            domains: record.domain_tags.join(DOMAIN_TAG_SEPARATOR),
            paper_link: format!("[PDF]({})", record.paper_url),
            code_link: record.code_url.as_ref().map_or_else(
                || no_code_marker.to_string(),
                |url| format!("[Code]({url})"),
            ),
        }
    }
}

/// Formats an author list, optionally keeping only the first author.
#[must_use]
pub fn format_authors(authors: &[String], first_author_only: bool) -> String {
    if first_author_only {
        authors.first().cloned().unwrap_or_default()
    } else {
        authors.join(", ")
    }
}
