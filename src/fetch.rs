//! Per-topic paper fetching and record assembly.
//!
//! For each paper returned by the literature source:
//! 1. derive the dedup identifier (version suffix stripped),
//! 2. tag it with every configured topic whose filters match the title,
//! 3. look up a code repository for `"<title> <identifier>"`,
//! 4. assemble the [`PaperRecord`].
//!
//! A failure while assembling one paper is logged and that paper skipped.
//! A failed literature search fails the whole topic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use crate::arxiv::{LiteratureSource, SourcePaper};
use crate::code_search::CodeSearch;
use crate::config::{Config, TopicFilters};
use crate::network::NetworkError;
use crate::paper::{PaperRecord, dedup_identifier, format_authors, paper_link};

/// Errors that cause a single paper to be skipped.
#[derive(Debug, Clone, Error)]
pub enum PaperError {
    /// The source returned an entry without an identifier
    #[error("paper has no identifier (title: '{title}')")]
    MissingIdentifier {
        /// Title of the offending entry
        title: String,
    },

    /// The publication timestamp could not be parsed
    #[error("paper {paper_id} has unparseable publication timestamp '{value}': {reason}")]
    InvalidPublished {
        /// Source identifier
        paper_id: String,
        /// Raw timestamp
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Records fetched for one topic in the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedTopic {
    /// Topic name.
    pub topic: String,
    /// Dedup identifier -> record.
    pub papers: BTreeMap<String, PaperRecord>,
}

/// Topics whose filters occur in `title`, compared case-insensitively.
#[must_use]
pub fn domain_tags(title: &str, keywords: &BTreeMap<String, TopicFilters>) -> Vec<String> {
    let title = title.to_lowercase();
    keywords
        .iter()
        .filter(|(_, topic)| {
            topic
                .filters
                .iter()
                .any(|filter| title.contains(&filter.to_lowercase()))
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// `2024-05-01T17:59:59Z` -> `2024-05-01` (UTC calendar date).
fn publication_date(paper: &SourcePaper) -> Result<String, PaperError> {
    DateTime::parse_from_rfc3339(&paper.published)
        .map(|timestamp| timestamp.with_timezone(&Utc).format("%Y-%m-%d").to_string())
        .map_err(|error| PaperError::InvalidPublished {
            paper_id: paper.short_id.clone(),
            value: paper.published.clone(),
            reason: error.to_string(),
        })
}

/// Fetches papers for topics and enriches them with code links.
pub struct PaperFetcher {
    literature: Box<dyn LiteratureSource>,
    code_search: Box<dyn CodeSearch>,
}

impl PaperFetcher {
    /// Creates a fetcher over the given sources.
    #[must_use]
    pub fn new(literature: Box<dyn LiteratureSource>, code_search: Box<dyn CodeSearch>) -> Self {
        Self {
            literature,
            code_search,
        }
    }

    /// Fetches up to `max_results` papers for `topic`.
    ///
    /// `config` supplies every topic's filters for domain tagging and the
    /// author formatting mode.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when the literature search itself fails.
    #[tracing::instrument(skip(self, query, config), fields(source = self.literature.name()))]
    pub async fn fetch(
        &self,
        topic: &str,
        query: &str,
        max_results: usize,
        config: &Config,
    ) -> Result<FetchedTopic, NetworkError> {
        let results = self.literature.search(query, max_results).await?;

        let mut fetched = FetchedTopic {
            topic: topic.to_string(),
            papers: BTreeMap::new(),
        };
        for paper in results.iter().take(max_results) {
            match self.assemble(paper, config).await {
                Ok((id, record)) => {
                    info!(
                        paper_id = %id,
                        title = %record.title,
                        tags = %record.domain_tags.join(", "),
                        "Found paper"
                    );
                    fetched.papers.insert(id, record);
                }
                Err(err) => {
                    error!(paper_id = %paper.short_id, error = %err, "Skipping paper");
                }
            }
        }
        Ok(fetched)
    }

    async fn assemble(
        &self,
        paper: &SourcePaper,
        config: &Config,
    ) -> Result<(String, PaperRecord), PaperError> {
        let id = dedup_identifier(&paper.short_id);
        if id.is_empty() {
            return Err(PaperError::MissingIdentifier {
                title: paper.title.clone(),
            });
        }

        let published = publication_date(paper)?;
        let tags = domain_tags(&paper.title, &config.keywords);

        let code_url = self
            .code_search
            .lookup(&format!("{} {id}", paper.title))
            .await
            .into_url();

        let record = PaperRecord {
            title: paper.title.clone(),
            authors: format_authors(&paper.authors, config.first_author_only),
            summary: paper.summary.replace("\r\n", " ").replace('\n', " "),
            published,
            domain_tags: tags,
            paper_url: paper_link(&id),
            code_url,
            extra: serde_json::Map::new(),
        };
        Ok((id, record))
    }
}

impl std::fmt::Debug for PaperFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperFetcher")
            .field("literature", &self.literature.name())
            .finish_non_exhaustive()
    }
}
