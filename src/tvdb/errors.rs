//! Typed errors for the TVDB metadata pipeline.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while talking to TVDB.
///
/// Nothing above the candidate fetcher ever sees these: individual
/// sub-query failures degrade to empty categories there.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum TvdbError {
    /// No API key configured; remote metadata is unavailable until the
    /// user supplies one.
    #[error("TVDB API key is not configured")]
    MissingApiKey,

    /// Login was rejected or returned no token.
    #[error("TVDB authentication failed: {0}")]
    Auth(String),

    /// The per-request deadline elapsed and the transport was aborted.
    #[error("TVDB request timed out ({0})")]
    Timeout(String),

    /// Non-success HTTP status.
    #[error("TVDB request failed ({0})")]
    Http(u16),

    /// Connection-level failure.
    #[error("TVDB network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape.
    #[error("TVDB parse error: {0}")]
    Parse(String),
}

impl TvdbError {
    /// Classify a transport error, distinguishing elapsed deadlines from
    /// other connection failures.
    pub(crate) fn from_transport(e: reqwest::Error, path: &str) -> Self {
        if e.is_timeout() {
            TvdbError::Timeout(path.to_string())
        } else if e.is_decode() {
            TvdbError::Parse(e.to_string())
        } else {
            TvdbError::Network(e.to_string())
        }
    }
}
