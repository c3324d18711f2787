//! Shared HTTP client construction policy for the search clients.
//!
//! Centralizes timeout, user-agent and compression defaults so the arXiv and
//! GitHub clients behave the same on the wire.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::network::NetworkError;
use crate::user_agent;

/// Default TCP connect timeout for search requests.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default whole-request timeout for search requests.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Timeouts applied to every search client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HttpSettings {
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Read (whole request) timeout in seconds.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_read_timeout_secs() -> u64 {
    DEFAULT_READ_TIMEOUT_SECS
}

/// Builds a search HTTP client using shared project policy.
///
/// `service` is only used in the error message.
///
/// # Errors
///
/// Returns [`NetworkError::ClientBuild`] when client construction fails.
pub fn build_http_client(service: &str, settings: HttpSettings) -> Result<Client, NetworkError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.read_timeout_secs))
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .build()
        .map_err(|error| NetworkError::client_build(service, &error.to_string()))
}
