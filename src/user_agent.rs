//! Shared User-Agent string for the literature and code search clients.
//!
//! GitHub rejects API requests without a User-Agent, and arXiv asks automated
//! clients to identify themselves, so both clients send the same header.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/arxiv-digest";

/// Default User-Agent for every outbound search request.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("arxiv-digest/{version} (research-digest; +{PROJECT_UA_URL})")
}
