//! LLM call errors.

use thiserror::Error;

/// Failure of a single model call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// Server-side failure (5xx) or an error payload.
    #[error("api error: {0}")]
    ApiError(String),

    /// Throttled (429).
    #[error("rate limit: {0}")]
    RateLimit(String),

    /// Missing or rejected credentials (401/403).
    #[error("auth failed: {0}")]
    Auth(String),

    /// Rejected request (other 4xx).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON.
    #[error("parsing failed: {0}")]
    Parsing(String),

    /// Response had no choices.
    #[error("empty response")]
    EmptyResponse,
}

impl LlmError {
    /// Maps a non-success HTTP status and its body to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => LlmError::Auth(body),
            429 => LlmError::RateLimit(body),
            400..=499 => LlmError::InvalidRequest(body),
            _ => LlmError::ApiError(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(LlmError::from_status(401, "x".into()), LlmError::Auth(_)));
        assert!(matches!(LlmError::from_status(403, "x".into()), LlmError::Auth(_)));
        assert!(matches!(LlmError::from_status(429, "x".into()), LlmError::RateLimit(_)));
        assert!(matches!(
            LlmError::from_status(400, "x".into()),
            LlmError::InvalidRequest(_)
        ));
        assert!(matches!(LlmError::from_status(502, "x".into()), LlmError::ApiError(_)));
    }
}
