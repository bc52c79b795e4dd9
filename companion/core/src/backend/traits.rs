//! Completion Backend Traits
//!
//! A completion backend takes one prompt string and returns one reply
//! string. There is no streaming, no history and no retry: one call, one
//! answer or one error.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a completion backend can report
#[derive(Debug, Error)]
pub enum BackendError {
    /// The service answered with a non-success HTTP status
    #[error("API request failed with status {status}: {body}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset...)
    ///
    /// The request URL is stripped, since its query string carries the key.
    #[error("Request failed: {0}")]
    Http(reqwest::Error),

    /// The response body was not valid JSON
    #[error("Failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Any other backend-specific failure
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Completion backend trait
///
/// Implement this trait to point the session at a different service, or at
/// a mock in tests.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Get the backend name (e.g., "Gemini")
    fn name(&self) -> &str;

    /// Send `prompt` as the sole content of a request and return the reply
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}
