//! Backend call failures
//!
//! Kept apart so tests can match on the category. The MCP layer flattens
//! these to text before they reach the assistant.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, TLS or I/O failure before a status was received
    #[error("request to backend failed: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-2xx status; `body` is the raw response text
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// 2xx response that is not valid JSON
    #[error("invalid backend response: {0}")]
    Decode(String),

    /// JSON response without a string `message` field
    #[error("backend response has no 'message' field")]
    MissingMessage,
}

impl BackendError {
    /// Short category name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Network(_) => "network",
            BackendError::Status { .. } => "status",
            BackendError::Decode(_) => "decode",
            BackendError::MissingMessage => "missing_message",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_includes_body() {
        let err = BackendError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("boom"));
        assert_eq!(err.kind(), "status");
    }
}
