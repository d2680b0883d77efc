//! Error types for the transport layer.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur while moving a vault file to or from a remote
/// location.
///
/// Callers treat every transport failure identically (abort the sync, show
/// the message, leave local and remote state untouched), so the contract is
/// the [`Display`](std::fmt::Display) text, not the variant. The variants
/// exist to keep messages precise and to preserve lower-level causes for
/// diagnostics.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The location string could not be used to build a request.
    #[error("invalid location [{location}]: {reason}")]
    InvalidLocation {
        /// The offending location string.
        location: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The underlying network stack failed (connection refused, reset,
    /// DNS, TLS handshake, malformed response).
    #[error("{operation} [{url}] failed: {source}")]
    Network {
        /// The operation being performed.
        operation: &'static str,
        /// The URL the request was issued against.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("{operation} [{url}] failed: the server returned [{status}]")]
    Status {
        /// The operation being performed.
        operation: &'static str,
        /// The URL the request was issued against.
        url: String,
        /// Human-readable status text, e.g. `404 Not Found`.
        status: String,
    },

    /// The server answered 200 but the response body was not the expected
    /// success sentinel.
    #[error("{operation} [{url}] failed: the server said [{body}]")]
    Rejected {
        /// The operation being performed.
        operation: &'static str,
        /// The URL the request was issued against.
        url: String,
        /// The response body the server sent instead of `OK`.
        body: String,
    },

    /// Local file I/O failed (reading the upload source, writing a
    /// downloaded temp file).
    #[error("{context}: {source}")]
    Io {
        /// What was being done when the failure occurred.
        context: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client itself could not be constructed (bad proxy URL,
    /// TLS backend initialization failure).
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A stored proxy password was not valid base64 or not valid UTF-8.
    #[error("failed to decode proxy password: {0}")]
    ProxyPassword(String),
}

impl TransportError {
    /// Creates an invalid-location error.
    pub fn invalid_location(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLocation {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a network-level failure, naming the operation and URL.
    pub fn network(operation: &'static str, url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            operation,
            url: url.into(),
            source,
        }
    }

    /// Creates an error from a non-success HTTP status.
    pub fn status(operation: &'static str, url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        let text = match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => status.as_u16().to_string(),
        };
        Self::Status {
            operation,
            url: url.into(),
            status: text,
        }
    }

    /// Creates an error from an unexpected response body.
    pub fn rejected(operation: &'static str, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Wraps a local I/O failure.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}
