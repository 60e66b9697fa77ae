//! Entur client error types.

use crate::domain::StopId;

/// How a failed fetch should be reported for its station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Upstream says the station doesn't exist or is inactive.
    NotFound,
    /// Network, timeout or non-success status. Retryable.
    Unavailable,
    /// Upstream answered with something we can't use.
    Malformed,
}

/// Errors from the Entur journey-planner client.
#[derive(Debug, thiserror::Error)]
pub enum EnturError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by Entur API")]
    RateLimited,

    /// Empty body, invalid JSON or a GraphQL error response
    #[error("malformed response: {message}{}", body_suffix(.body))]
    Malformed {
        message: String,
        body: Option<String>,
    },

    /// `data.stopPlace` was null or absent
    #[error("stop place {0} not found or inactive")]
    NotFound(StopId),

    /// Client could not be constructed
    #[error("not configured: {0}")]
    NotConfigured(String),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

impl EnturError {
    /// Classify this error for per-station reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            EnturError::NotFound(_) => FailureKind::NotFound,
            EnturError::Malformed { .. } => FailureKind::Malformed,
            EnturError::Http(_)
            | EnturError::Status { .. }
            | EnturError::RateLimited
            | EnturError::NotConfigured(_) => FailureKind::Unavailable,
        }
    }
}
