//! arXiv literature search over the Atom API.
//!
//! The API is queried with `sortBy=submittedDate&sortOrder=descending`, so
//! results arrive newest first. Query failures are reported by arXiv as a
//! regular feed holding a single entry whose id points at `/api/errors`;
//! [`parse_atom_feed`] turns that into [`NetworkError::Api`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::DEFAULT_ARXIV_API_URL;
use crate::http_client::{HttpSettings, build_http_client};
use crate::network::NetworkError;

const SERVICE: &str = "arxiv";
const ERROR_ENTRY_MARKER: &str = "/api/errors";

/// Paper metadata as returned by a literature source, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaper {
    /// Short identifier, possibly carrying a version suffix (`2401.01234v2`).
    pub short_id: String,
    /// Title with whitespace runs collapsed.
    pub title: String,
    /// Author names in listed order.
    pub authors: Vec<String>,
    /// Abstract text as returned.
    pub summary: String,
    /// Raw publication timestamp (RFC 3339).
    pub published: String,
}

/// A searchable literature index.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Returns the source name used in logs.
    fn name(&self) -> &str;

    /// Returns up to `max_results` papers matching `query`, newest submission first.
    async fn search(&self, query: &str, max_results: usize)
    -> Result<Vec<SourcePaper>, NetworkError>;
}

// ==================== Atom feed types ====================

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    author: Vec<AtomAuthor>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: String,
}

/// Parses an arXiv Atom response body.
///
/// # Errors
///
/// Returns [`NetworkError::Decode`] when the body is not a readable feed and
/// [`NetworkError::Api`] when arXiv reports a query error.
pub fn parse_atom_feed(body: &str) -> Result<Vec<SourcePaper>, NetworkError> {
    let feed: AtomFeed = quick_xml::de::from_str(body)
        .map_err(|error| NetworkError::decode(SERVICE, &error.to_string()))?;

    if let Some(error_entry) = feed
        .entry
        .iter()
        .find(|entry| entry.id.contains(ERROR_ENTRY_MARKER))
    {
        return Err(NetworkError::api(
            SERVICE,
            &collapse_whitespace(&error_entry.summary),
        ));
    }

    Ok(feed
        .entry
        .into_iter()
        .map(|entry| SourcePaper {
            short_id: short_id_from_entry_id(&entry.id),
            title: collapse_whitespace(&entry.title),
            authors: entry
                .author
                .into_iter()
                .map(|author| collapse_whitespace(&author.name))
                .collect(),
            summary: entry.summary.trim().to_string(),
            published: entry.published.unwrap_or_default().trim().to_string(),
        })
        .collect())
}

/// `http://arxiv.org/abs/2401.01234v2` -> `2401.01234v2`.
fn short_id_from_entry_id(entry_id: &str) -> String {
    let trimmed = entry_id.trim();
    trimmed
        .rfind("/abs/")
        .map_or(trimmed, |index| &trimmed[index + "/abs/".len()..])
        .trim_matches('/')
        .to_string()
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ==================== ArxivClient ====================

/// Literature source backed by the arXiv Atom API.
pub struct ArxivClient {
    client: Client,
    base_url: String,
}

impl ArxivClient {
    /// Creates a client for the public arXiv endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when HTTP client construction fails.
    pub fn new(settings: HttpSettings) -> Result<Self, NetworkError> {
        Self::with_base_url(DEFAULT_ARXIV_API_URL, settings)
    }

    /// Creates a client for a custom endpoint (mirrors, wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when HTTP client construction fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        settings: HttpSettings,
    ) -> Result<Self, NetworkError> {
        Ok(Self {
            client: build_http_client(SERVICE, settings)?,
            base_url: base_url.into(),
        })
    }

    fn search_url(&self, query: &str, max_results: usize) -> Result<Url, NetworkError> {
        let max_results = max_results.to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ],
        )
        .map_err(|error| NetworkError::request(SERVICE, &format!("invalid endpoint: {error}")))
    }
}

impl std::fmt::Debug for ArxivClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArxivClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LiteratureSource for ArxivClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[tracing::instrument(skip(self), fields(source = SERVICE))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SourcePaper>, NetworkError> {
        let url = self.search_url(query, max_results)?;
        debug!(api_url = %url, "Calling arXiv API");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| NetworkError::request(SERVICE, &error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::http_status(SERVICE, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|error| NetworkError::decode(SERVICE, &error.to_string()))?;

        let papers = parse_atom_feed(&body)?;
        debug!(count = papers.len(), "arXiv returned papers");
        Ok(papers)
    }
}
