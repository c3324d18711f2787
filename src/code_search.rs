//! Best-effort code repository lookup via GitHub repository search.
//!
//! A lookup never fails the caller. [`CodeLookup`] keeps "nothing matched"
//! apart from "the call failed" so the two show up differently in logs, and
//! [`CodeLookup::into_url`] folds both into "no code link" for the record.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::DEFAULT_GITHUB_API_URL;
use crate::http_client::{HttpSettings, build_http_client};
use crate::network::NetworkError;

const SERVICE: &str = "github";

/// Outcome of a single code lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeLookup {
    /// Repository page of the most-starred match.
    Found(String),
    /// The search ran and matched nothing.
    NoMatch,
    /// The search could not be completed.
    Failed(String),
}

impl CodeLookup {
    /// The repository URL, if one was found.
    #[must_use]
    pub fn into_url(self) -> Option<String> {
        match self {
            Self::Found(url) => Some(url),
            Self::NoMatch | Self::Failed(_) => None,
        }
    }
}

/// A searchable code host.
#[async_trait]
pub trait CodeSearch: Send + Sync {
    /// Returns the best-match repository for a free-text query.
    async fn lookup(&self, query: &str) -> CodeLookup;
}

// ==================== GitHub API response types ====================

#[derive(Debug, Deserialize)]
struct RepositorySearchResponse {
    total_count: u64,
    #[serde(default)]
    items: Vec<RepositoryItem>,
}

#[derive(Debug, Deserialize)]
struct RepositoryItem {
    html_url: String,
}

// ==================== GithubCodeSearch ====================

/// Repository search sorted by stars, descending.
pub struct GithubCodeSearch {
    client: Client,
    base_url: String,
}

impl GithubCodeSearch {
    /// Creates a client for the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when HTTP client construction fails.
    pub fn new(settings: HttpSettings) -> Result<Self, NetworkError> {
        Self::with_base_url(DEFAULT_GITHUB_API_URL, settings)
    }

    /// Creates a client for a custom endpoint (GitHub Enterprise, wiremock).
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

    async fn search(&self, query: &str) -> Result<Option<String>, NetworkError> {
        let url = Url::parse_with_params(
            &self.base_url,
            &[("q", query), ("sort", "stars"), ("order", "desc")],
        )
        .map_err(|error| NetworkError::request(SERVICE, &format!("invalid endpoint: {error}")))?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|error| NetworkError::request(SERVICE, &error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::http_status(SERVICE, status.as_u16()));
        }

        let body: RepositorySearchResponse = response
            .json()
            .await
            .map_err(|error| NetworkError::decode(SERVICE, &error.to_string()))?;

        if body.total_count == 0 {
            return Ok(None);
        }
        body.items
            .into_iter()
            .next()
            .map(|item| Some(item.html_url))
            .ok_or_else(|| NetworkError::decode(SERVICE, "total_count > 0 but items is empty"))
    }
}

impl std::fmt::Debug for GithubCodeSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubCodeSearch")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CodeSearch for GithubCodeSearch {
    #[tracing::instrument(skip(self), fields(service = SERVICE))]
    async fn lookup(&self, query: &str) -> CodeLookup {
        match self.search(query).await {
            Ok(Some(url)) => {
                debug!(repo = %url, "Code repository found");
                CodeLookup::Found(url)
            }
            Ok(None) => {
                debug!("No code repository matched");
                CodeLookup::NoMatch
            }
            Err(error) => {
                warn!(error = %error, "Code lookup failed; treating as no code");
                CodeLookup::Failed(error.to_string())
            }
        }
    }
}
