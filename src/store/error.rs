//! Error types for the persisted paper store.

use std::path::Path;

use thiserror::Error;

/// Errors raised while reading or writing a store file.
///
/// Fatal for the publishing target that owns the file only.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but does not hold a topic -> identifier -> record mapping
    #[error("store file '{path}' is not a valid paper store: {reason}\n  Suggestion: Repair the JSON by hand; the file was left untouched and removing it discards the stored history")]
    Malformed {
        /// Store path
        path: String,
        /// Parser message
        reason: String,
    },

    /// Reading or writing the file failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The store could not be encoded (shouldn't occur for well-formed records)
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(path: &Path, reason: &str) -> Self {
        Self::Malformed {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `Io` error.
    #[must_use]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
