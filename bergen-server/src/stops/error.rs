//! Stop directory and feed import error types.

/// Errors that can occur while importing or caching the stop feed.
#[derive(Debug, thiserror::Error)]
pub enum StopImportError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed server returned an error status
    #[error("feed download failed with status {status}")]
    Status { status: u16 },

    /// The archive could not be read or lacks `stops.txt`
    #[error("archive error: {message}")]
    Archive { message: String },

    /// `stops.txt` could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The feed parsed but produced no stops
    #[error("feed contained no stops")]
    EmptyFeed,

    /// Cache operation failed
    #[error("cache error: {message}")]
    Cache { message: String },
}

/// Outcome of a name lookup that matched nothing.
///
/// This is a normal result, not a failure of the directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no stop matches '{0}'")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StopImportError::Status { status: 502 };
        assert_eq!(err.to_string(), "feed download failed with status 502");

        let err = StopImportError::EmptyFeed;
        assert_eq!(err.to_string(), "feed contained no stops");

        let err = ResolveError::NotFound("Nowhere".into());
        assert_eq!(err.to_string(), "no stop matches 'Nowhere'");
    }
}
