//! Error types for the query path.

use std::time::Duration;

use thiserror::Error;

/// Why a query did not produce an answer.
///
/// A missing `answer` field is not an error: it resolves to the fallback
/// phrase instead (see [`crate::dispatch::Outcome`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The endpoint answered with a non-success HTTP status.
    #[error("server returned status {0}")]
    Status(u16),

    /// Connection refused, DNS failure, reset mid-body and friends.
    #[error("service unreachable: {0}")]
    Unreachable(String),

    /// A success status whose body wasn't JSON, e.g. a proxy's HTML page
    /// while the service is still starting.
    #[error("unreadable response body: {0}")]
    Malformed(String),

    /// The bounded wait expired before a response arrived.
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Errors building the HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http client setup failed: {0}")]
    Build(#[from] reqwest::Error),
}

/// Errors from the session flag store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
