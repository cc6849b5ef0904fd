//! Remote data source error types

use std::time::Duration;

/// Errors that can occur while fetching from a remote data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP error response from the source.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// Network error during the fetch.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the source response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// The source refused or could not serve the request.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if a caller could reasonably retry this fetch.
    ///
    /// The grid itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        assert_eq!(SourceError::http(404, "not found").status_code(), Some(404));
        assert_eq!(SourceError::Timeout(Duration::from_secs(1)).status_code(), None);
    }

    #[test]
    fn test_is_retryable() {
        assert!(SourceError::http(503, "busy").is_retryable());
        assert!(SourceError::http(429, "slow down").is_retryable());
        assert!(!SourceError::http(400, "bad request").is_retryable());
        assert!(SourceError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!SourceError::parse_with_body("bad json", "{").is_retryable());
        assert!(!SourceError::Unavailable("down".to_string()).is_retryable());
    }
}
