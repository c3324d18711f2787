//! Error type shared by the literature-search and code-search clients.
//!
//! Follows the What/Why/Fix message pattern used across the project.

use thiserror::Error;

/// Errors raised by a search API call.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// The HTTP client could not be constructed
    #[error("could not initialize {service} client: {reason}")]
    ClientBuild {
        /// Which service the client was for
        service: String,
        /// Why construction failed
        reason: String,
    },

    /// The request never produced a response
    #[error("request to {service} failed: {reason}\n  Suggestion: Check network connectivity and retry")]
    Request {
        /// Which service was called
        service: String,
        /// Transport-level failure description
        reason: String,
    },

    /// The service answered with a non-success status
    #[error("{service} returned HTTP {status}\n  Suggestion: {suggestion}")]
    HttpStatus {
        /// Which service was called
        service: String,
        /// HTTP status code
        status: u16,
        /// How to fix the issue
        suggestion: String,
    },

    /// The response body did not match the expected schema
    #[error("unexpected {service} response: {reason}\n  Suggestion: The API format may have changed")]
    Decode {
        /// Which service was called
        service: String,
        /// Why decoding failed
        reason: String,
    },

    /// The service reported an error inside an otherwise valid response
    #[error("{service} rejected the query: {message}\n  Suggestion: Check the topic filters in the configuration")]
    Api {
        /// Which service was called
        service: String,
        /// Message reported by the service
        message: String,
    },
}

impl NetworkError {
    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(service: &str, reason: &str) -> Self {
        Self::ClientBuild {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Request` error.
    #[must_use]
    pub fn request(service: &str, reason: &str) -> Self {
        Self::Request {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `HttpStatus` error with a status-specific suggestion.
    #[must_use]
    pub fn http_status(service: &str, status: u16) -> Self {
        let suggestion = match status {
            403 | 429 => "The service is throttling requests. Try again later.",
            s if s >= 500 => "The service is unavailable. Try again later.",
            _ => "Check the configured API endpoint",
        };
        Self::HttpStatus {
            service: service.to_string(),
            status,
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `Decode` error.
    #[must_use]
    pub fn decode(service: &str, reason: &str) -> Self {
        Self::Decode {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `Api` error.
    #[must_use]
    pub fn api(service: &str, message: &str) -> Self {
        Self::Api {
            service: service.to_string(),
            message: message.to_string(),
        }
    }
}
