//! Error types for the client.

use std::time::Duration;

use thiserror::Error;

use crate::resource::Resource;

/// Errors produced by client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API returned an error payload
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<i32>,
        retry_after: Option<u64>,
    },

    /// Rate limited
    #[error("rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// The resource requires an authenticated session
    #[error("{resource} requires an authenticated session")]
    AccessDenied { resource: Resource },

    /// Guest session activation failed
    #[error("guest session error: {0}")]
    Auth(String),

    /// A required request parameter was not supplied
    #[error("missing request parameter: {0}")]
    MissingParam(&'static str),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error is worth retrying at the transport layer.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Get the suggested retry delay, when the API supplied one.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(Duration::from_secs(*retry_after)),
            Self::Api { retry_after, .. } => retry_after.map(Duration::from_secs),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
