use thiserror::Error;

use crate::domain::errors::DomainError;

/// Errors that can occur when calling the embeddings API
#[derive(Error, Debug)]
pub enum EmbeddingApiError {
    /// Invalid request parameters or malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed due to invalid or missing API key
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No API key configured at all; surfaced before any round trip
    #[error("No API key configured. Set OPENAI_API_KEY or embedding.api_key")]
    MissingApiKey,

    /// Rate limit exceeded, retry after waiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// API server encountered an internal error
    #[error("API server error: {0}")]
    ServerError(String),

    /// API server is overloaded, retry later
    #[error("API server overloaded")]
    Overloaded,

    /// Network error occurred during request
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The pipeline deadline would be exceeded by the next backoff sleep
    #[error("Deadline exceeded while retrying")]
    DeadlineExceeded,

    /// Response shape did not match the request (count or dimension)
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Unknown error occurred
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl EmbeddingApiError {
    /// Returns true if this error is transient and should be retried.
    ///
    /// Transient: rate limiting, 5xx-class server errors, overload, and
    /// network-level failures. Permanent: bad requests, auth failures,
    /// malformed responses.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EmbeddingApiError::RateLimitExceeded
                | EmbeddingApiError::ServerError(_)
                | EmbeddingApiError::Overloaded
                | EmbeddingApiError::Network(_)
        )
    }

    /// Map an HTTP status code and response body to an error variant.
    ///
    /// - 400: invalid request
    /// - 401, 403: authentication failed
    /// - 429: rate limit exceeded
    /// - 5xx: server error
    /// - 529: server overloaded
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => EmbeddingApiError::InvalidRequest(body),
            401 | 403 => EmbeddingApiError::AuthenticationFailed(body),
            429 => EmbeddingApiError::RateLimitExceeded,
            529 => EmbeddingApiError::Overloaded,
            code if (500..600).contains(&code) => EmbeddingApiError::ServerError(body),
            _ => EmbeddingApiError::Unknown(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<EmbeddingApiError> for DomainError {
    fn from(err: EmbeddingApiError) -> Self {
        match err {
            EmbeddingApiError::DeadlineExceeded => DomainError::DeadlineExceeded,
            EmbeddingApiError::MissingApiKey => DomainError::ServiceUnavailable(err.to_string()),
            other => DomainError::EmbeddingFailed(other.to_string()),
        }
    }
}
