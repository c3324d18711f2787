//! Topic and publishing configuration.
//!
//! The configuration is a YAML document:
//!
//! ```yaml
//! max_results: 10
//! publish_readme: true
//! publish_gitpage: true
//! show_badge: true
//! json_readme_path: ./docs/papers.json
//! json_gitpage_path: ./docs/gitpage.json
//! md_readme_path: README.md
//! md_gitpage_path: ./docs/index.md
//! keywords:
//!   "Fraud Detection":
//!     filters: ["fraud detection", "anti-fraud"]
//! ```
//!
//! Each topic's filters become one arXiv query, `"a" OR "b"`, and are also
//! used to tag papers fetched for any topic (see [`crate::fetch`]).

mod error;

pub use error::ConfigError;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::http_client::HttpSettings;
use crate::report::ReportLabels;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Default arXiv Atom API endpoint.
pub const DEFAULT_ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// Default GitHub repository search endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com/search/repositories";

/// Upper bound the arXiv API accepts for a single request.
pub const MAX_RESULTS_LIMIT: usize = 2000;

const DEFAULT_REPORT_TITLE: &str = "Daily arXiv Papers";
const DEFAULT_NO_CODE_MARKER: &str = "none";

/// Keyword filters for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicFilters {
    /// Literal phrases; a paper matches the topic when its title contains one.
    pub filters: Vec<String>,
}

/// Parsed configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Topic name -> filters. Names are unique by construction.
    pub keywords: BTreeMap<String, TopicFilters>,
    /// Maximum papers requested per topic.
    pub max_results: usize,
    /// Publish the README target.
    #[serde(default = "default_true")]
    pub publish_readme: bool,
    /// Publish the site page target.
    #[serde(default = "default_true")]
    pub publish_gitpage: bool,
    /// Persisted store for the README target.
    pub json_readme_path: PathBuf,
    /// Persisted store for the site page target.
    pub json_gitpage_path: PathBuf,
    /// Rendered Markdown for the README target.
    pub md_readme_path: PathBuf,
    /// Rendered Markdown for the site page target.
    pub md_gitpage_path: PathBuf,
    /// Emit the stars badge line under the report header.
    #[serde(default)]
    pub show_badge: bool,
    /// Repository (`owner/name`) the badge points at.
    #[serde(default)]
    pub badge_repo: Option<String>,
    /// Keep only the first author on each record.
    #[serde(default)]
    pub first_author_only: bool,
    /// Report heading text.
    #[serde(default = "default_report_title")]
    pub report_title: String,
    /// Cell text for papers without a code link.
    #[serde(default = "default_no_code_marker")]
    pub no_code_marker: String,
    /// Report section and column headings.
    #[serde(default)]
    pub report_labels: ReportLabels,
    /// Search client timeouts.
    #[serde(default)]
    pub http: HttpSettings,
    /// arXiv API endpoint.
    #[serde(default = "default_arxiv_api_url")]
    pub arxiv_api_url: String,
    /// GitHub repository search endpoint.
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
}

fn default_true() -> bool {
    true
}

fn default_report_title() -> String {
    DEFAULT_REPORT_TITLE.to_string()
}

fn default_no_code_marker() -> String {
    DEFAULT_NO_CODE_MARKER.to_string()
}

fn default_arxiv_api_url() -> String {
    DEFAULT_ARXIV_API_URL.to_string()
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

/// A topic paired with its ready-to-send search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuery {
    /// Topic name.
    pub topic: String,
    /// Boolean OR query over the topic's quoted filters.
    pub query: String,
}

/// One publishing destination: a persisted store and the Markdown rendered from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Stable label for logs (`readme`, `gitpage`).
    pub name: &'static str,
    /// JSON store path.
    pub store_path: PathBuf,
    /// Markdown output path.
    pub report_path: PathBuf,
}

impl Config {
    /// Validates invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.is_empty() {
            return Err(ConfigError::invalid(
                "keywords",
                "at least one topic must be configured",
            ));
        }
        for (topic, filters) in &self.keywords {
            if topic.trim().is_empty() {
                return Err(ConfigError::invalid("keywords", "topic names must not be blank"));
            }
            if filters.filters.is_empty() {
                return Err(ConfigError::invalid(
                    &format!("keywords.{topic}.filters"),
                    "each topic needs at least one filter",
                ));
            }
            if filters.filters.iter().any(|filter| filter.trim().is_empty()) {
                return Err(ConfigError::invalid(
                    &format!("keywords.{topic}.filters"),
                    "filters must not be blank",
                ));
            }
        }

        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            return Err(ConfigError::invalid(
                "max_results",
                &format!(
                    "{} is out of range. Expected range: 1..={MAX_RESULTS_LIMIT}",
                    self.max_results
                ),
            ));
        }

        validate_timeout_secs("http.connect_timeout_secs", self.http.connect_timeout_secs)?;
        validate_timeout_secs("http.read_timeout_secs", self.http.read_timeout_secs)?;

        if let Some(repo) = &self.badge_repo {
            let valid = repo
                .split_once('/')
                .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'));
            if !valid {
                return Err(ConfigError::invalid(
                    "badge_repo",
                    &format!("'{repo}' is not in owner/name form"),
                ));
            }
        }

        for (key, label) in self.report_labels.entries() {
            if label.trim().is_empty() || label.contains(['|', '\n', '\r']) {
                return Err(ConfigError::invalid(
                    &format!("report_labels.{key}"),
                    "headings must be non-blank single-line text without '|'",
                ));
            }
        }

        validate_endpoint("arxiv_api_url", &self.arxiv_api_url)?;
        validate_endpoint("github_api_url", &self.github_api_url)?;
        Ok(())
    }

    /// Topic name -> search query, in topic order.
    #[must_use]
    pub fn topic_queries(&self) -> Vec<TopicQuery> {
        self.keywords
            .iter()
            .map(|(topic, filters)| TopicQuery {
                topic: topic.clone(),
                query: build_or_query(&filters.filters),
            })
            .collect()
    }

    /// Enabled publishing targets, README first.
    #[must_use]
    pub fn publish_targets(&self) -> Vec<PublishTarget> {
        let mut targets = Vec::new();
        if self.publish_readme {
            targets.push(PublishTarget {
                name: "readme",
                store_path: self.json_readme_path.clone(),
                report_path: self.md_readme_path.clone(),
            });
        }
        if self.publish_gitpage {
            targets.push(PublishTarget {
                name: "gitpage",
                store_path: self.json_gitpage_path.clone(),
                report_path: self.md_gitpage_path.clone(),
            });
        }
        targets
    }
}

fn validate_timeout_secs(field: &str, value: u64) -> Result<(), ConfigError> {
    if (1..=3600).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            &format!("{value} is out of range. Expected range: 1..=3600"),
        ))
    }
}

fn validate_endpoint(field: &str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(ConfigError::invalid(
            field,
            &format!("scheme '{}' is not supported", parsed.scheme()),
        )),
        Err(error) => Err(ConfigError::invalid(field, &error.to_string())),
    }
}

/// Joins filters into an arXiv boolean query, each quoted as a literal phrase.
///
/// Double quotes inside a filter would end the phrase early, so they are dropped.
#[must_use]
pub fn build_or_query(filters: &[String]) -> String {
    filters
        .iter()
        .map(|filter| format!("\"{}\"", filter.replace('"', "")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Parses and validates a configuration document.
///
/// `path` is only used in error messages.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed YAML or missing keys and
/// [`ConfigError::Invalid`] for invariant violations.
pub fn parse_config_str(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config =
        serde_yaml::from_str(raw).map_err(|error| ConfigError::parse(path, &error.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file is missing, malformed or invalid.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|error| ConfigError::read(path, error))?;
    let config = parse_config_str(&raw, path)?;

    info!(
        topics = config.keywords.len(),
        max_results = config.max_results,
        publish_readme = config.publish_readme,
        publish_gitpage = config.publish_gitpage,
        "Loaded configuration"
    );
    for query in config.topic_queries() {
        debug!(topic = %query.topic, query = %query.query, "Topic query");
    }
    debug!(?config, "Full configuration");
    Ok(config)
}
