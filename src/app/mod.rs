//! One digest run: fetch every topic, then publish each enabled target.
//!
//! A failed topic search skips that topic. A store that cannot be merged or
//! rendered fails only its own target.

use tracing::{error, info};

use crate::arxiv::ArxivClient;
use crate::code_search::GithubCodeSearch;
use crate::config::{Config, PublishTarget};
use crate::fetch::{FetchedTopic, PaperFetcher};
use crate::network::NetworkError;
use crate::report::{ReportOptions, render_file};
use crate::store::{StoreError, merge_into_file};

/// Outcome counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Topics whose search succeeded.
    pub topics_fetched: usize,
    /// Topics whose search failed.
    pub topics_failed: usize,
    /// Records fetched across all topics.
    pub papers: usize,
    /// Targets merged and rendered.
    pub targets_published: Vec<&'static str>,
    /// Targets that failed.
    pub targets_failed: Vec<&'static str>,
}

/// Builds the arXiv + GitHub fetcher from configured endpoints and timeouts.
///
/// # Errors
///
/// Returns [`NetworkError`] when an HTTP client cannot be constructed.
pub fn build_fetcher(config: &Config) -> Result<PaperFetcher, NetworkError> {
    let literature = ArxivClient::with_base_url(config.arxiv_api_url.clone(), config.http)?;
    let code_search = GithubCodeSearch::with_base_url(config.github_api_url.clone(), config.http)?;
    Ok(PaperFetcher::new(Box::new(literature), Box::new(code_search)))
}

/// Fetches every configured topic in order, one at a time.
///
/// Returns the fetched topics and the number of topics that failed.
pub async fn fetch_all(fetcher: &PaperFetcher, config: &Config) -> (Vec<FetchedTopic>, usize) {
    let mut fetched = Vec::new();
    let mut failed = 0;
    for query in config.topic_queries() {
        info!(topic = %query.topic, "Fetching topic");
        match fetcher
            .fetch(&query.topic, &query.query, config.max_results, config)
            .await
        {
            Ok(topic) => {
                info!(topic = %topic.topic, papers = topic.papers.len(), "Topic fetched");
                fetched.push(topic);
            }
            Err(err) => {
                error!(topic = %query.topic, error = %err, "Topic fetch failed; skipping topic");
                failed += 1;
            }
        }
    }
    (fetched, failed)
}

/// Merges `batch` into the target's store and re-renders its report.
///
/// # Errors
///
/// Returns [`StoreError`] when the store is malformed or a file cannot be written.
pub fn publish_target(
    target: &PublishTarget,
    batch: &[FetchedTopic],
    options: &ReportOptions,
) -> Result<(), StoreError> {
    merge_into_file(&target.store_path, batch)?;
    render_file(&target.store_path, &target.report_path, options)
}

/// Runs the whole pipeline with the given fetcher.
pub async fn run(config: &Config, fetcher: &PaperFetcher) -> RunSummary {
    let (batch, topics_failed) = fetch_all(fetcher, config).await;

    let mut summary = RunSummary {
        topics_fetched: batch.len(),
        topics_failed,
        papers: batch.iter().map(|topic| topic.papers.len()).sum(),
        ..RunSummary::default()
    };

    let options = ReportOptions::from(config);
    for target in config.publish_targets() {
        match publish_target(&target, &batch, &options) {
            Ok(()) => {
                info!(
                    target = target.name,
                    report = %target.report_path.display(),
                    "Target published"
                );
                summary.targets_published.push(target.name);
            }
            Err(err) => {
                error!(target = target.name, error = %err, "Target publish failed");
                summary.targets_failed.push(target.name);
            }
        }
    }

    info!(
        topics_fetched = summary.topics_fetched,
        topics_failed = summary.topics_failed,
        papers = summary.papers,
        "Run complete"
    );
    summary
}
