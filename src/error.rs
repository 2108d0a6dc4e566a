//! Error types shared across the client, pipeline and tool layers.

/// Message returned whenever a tool needs the upstream client but no
/// credential was configured.
pub const MISSING_TOKEN_MESSAGE: &str = "Readwise access token not provided. Please set READWISE_TOKEN in your MCP configuration or environment variables. You can get your token from https://readwise.io/access_token";

/// Errors that can occur when talking to Readwise Reader
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// No credential configured; raised before any network call
    #[error("{}", MISSING_TOKEN_MESSAGE)]
    MissingToken,

    /// Upstream returned a non-2xx status other than 429
    #[error("Readwise API error: {status} {status_text} - {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Upstream returned 429
    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Tag update targeted a document that does not exist
    #[error("Document not found")]
    DocumentNotFound(String),

    /// Tool arguments were well-formed JSON but semantically invalid
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Cursor chain did not terminate within the configured page budget
    #[error("Pagination stopped after {0} pages without reaching the end of the listing")]
    PageLimitExceeded(usize),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReaderError {
    /// Seconds to wait before retrying, when upstream asked for backoff
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ReaderError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ReaderError {
    fn from(err: reqwest::Error) -> Self {
        ReaderError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ReaderError {
    fn from(err: serde_json::Error) -> Self {
        ReaderError::Parse(format!("JSON: {}", err))
    }
}

impl From<config::ConfigError> for ReaderError {
    fn from(err: config::ConfigError) -> Self {
        ReaderError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_message_is_stable() {
        assert_eq!(ReaderError::MissingToken.to_string(), MISSING_TOKEN_MESSAGE);
        assert_eq!(
            ReaderError::MissingToken.to_string(),
            ReaderError::MissingToken.to_string()
        );
    }

    #[test]
    fn test_api_error_carries_status_and_body() {
        let err = ReaderError::Api {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: "{\"detail\":\"boom\"}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_rate_limited_exposes_retry_after() {
        let err = ReaderError::RateLimited { retry_after: 42 };
        assert_eq!(err.retry_after(), Some(42));
        assert!(err.to_string().contains("42 seconds"));
        assert_eq!(ReaderError::Network("x".into()).retry_after(), None);
    }
}
