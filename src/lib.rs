//! arXiv Digest Core Library
//!
//! Builds a daily digest of arXiv papers: one search per configured topic,
//! a best-effort code repository lookup per paper, a JSON store per
//! publishing target that accumulates papers across runs, and a Markdown
//! report rendered from each store.
//!
//! # Architecture
//!
//! - [`config`] - YAML configuration loading and validation
//! - [`arxiv`] - arXiv Atom API client and the [`LiteratureSource`] seam
//! - [`code_search`] - GitHub repository search and the [`CodeSearch`] seam
//! - [`fetch`] - per-topic record assembly and domain tagging
//! - [`store`] - persisted topic -> identifier -> record store
//! - [`report`] - Markdown rendering
//! - [`app`] - one end-to-end run over every enabled target

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod arxiv;
pub mod code_search;
pub mod config;
pub mod fetch;
pub mod http_client;
pub mod network;
pub mod paper;
pub mod report;
pub mod store;
mod user_agent;

// Re-export commonly used types
pub use app::{RunSummary, build_fetcher, fetch_all, publish_target, run};
pub use arxiv::{ArxivClient, LiteratureSource, SourcePaper, parse_atom_feed};
pub use code_search::{CodeLookup, CodeSearch, GithubCodeSearch};
pub use config::{
    Config, ConfigError, DEFAULT_CONFIG_PATH, PublishTarget, TopicFilters, TopicQuery,
    build_or_query, load_config, parse_config_str,
};
pub use fetch::{FetchedTopic, PaperError, PaperFetcher, domain_tags};
pub use http_client::{HttpSettings, build_http_client};
pub use network::NetworkError;
pub use paper::{PaperRecord, WebRecord, dedup_identifier, format_authors, paper_link};
pub use report::{ReportLabels, ReportOptions, render_file, render_markdown, topic_anchor};
pub use store::{PaperStore, StoreError, TopicPapers, merge_into_file};
