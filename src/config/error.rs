//! Error types for configuration loading.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while loading the topic configuration.
///
/// Every variant is fatal: the run stops before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("cannot read config file '{path}': {source}\n  Suggestion: Pass --config-path or create {path}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or is missing required keys
    #[error("cannot parse config file '{path}': {reason}\n  Suggestion: Required keys are keywords, max_results and the four output paths")]
    Parse {
        /// Path that was parsed
        path: String,
        /// Parser message
        reason: String,
    },

    /// A value parsed but violates a configuration invariant
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending key
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Creates a `Read` error.
    #[must_use]
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.display().to_string(),
            source,
        }
    }

    /// Creates a `Parse` error.
    #[must_use]
    pub fn parse(path: &Path, reason: &str) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `Invalid` error.
    #[must_use]
    pub fn invalid(field: &str, reason: &str) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
