//! Error types for the bike and weather proxies.

use thiserror::Error;

/// Errors from a proxied upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("{upstream} returned status {status}")]
    Status { upstream: &'static str, status: u16 },

    /// Upstream answered with JSON of an unexpected shape.
    #[error("{upstream} response malformed: {message}")]
    Malformed {
        upstream: &'static str,
        message: String,
    },

    /// The client could not be built from its configuration.
    #[error("not configured: {0}")]
    NotConfigured(String),
}
