//! Error types for remote quality gate operations.

use thiserror::Error;

/// Errors returned by [`crate::QualityGates`] implementations.
///
/// `NotFound` is semantic (the remote entity does not exist) and is
/// recovered by the caller into an "absent" observation. Every other
/// variant is a transport or protocol failure and is surfaced.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured deadline.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The client could not be constructed from its configuration.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// True for the semantic absence of the remote entity, as opposed to a
    /// transport failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
