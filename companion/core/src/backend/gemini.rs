//! Gemini Backend Implementation
//!
//! Completion backend for Google's generative-language API.
//!
//! # Gemini API
//!
//! `POST {endpoint}?key={api_key}` with a body of the form
//!
//! ```json
//! { "contents": [ { "parts": [ { "text": "<prompt>" } ] } ] }
//! ```
//!
//! The reply is read from `candidates[0].content.parts[0].text`.

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{BackendError, CompletionBackend};
use crate::config::CompanionConfig;

/// Default `generateContent` endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Returned in place of a reply when the response carries no reply text
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response received";

/// JSON pointer to the reply text
const REPLY_POINTER: &str = "/candidates/0/content/parts/0/text";

/// Gemini backend client
#[derive(Clone)]
pub struct GeminiBackend {
    /// Full `generateContent` URL, without query string
    endpoint: String,
    /// API key, sent as the `key` query parameter
    api_key: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Create from loaded configuration
    #[must_use]
    pub fn from_config(config: &CompanionConfig) -> Self {
        Self::new(config.endpoint.clone(), config.api_key.clone())
    }

    /// Build the request body for a prompt
    fn build_body(prompt: &str) -> Value {
        serde_json::json!({
            "contents": [
                {
                    "parts": [
                        { "text": prompt }
                    ]
                }
            ]
        })
    }

    /// Pull the reply text out of a parsed response
    ///
    /// A missing or empty reply field yields [`NO_RESPONSE_PLACEHOLDER`]
    /// rather than an error.
    fn extract_reply(data: &Value) -> String {
        match data.pointer(REPLY_POINTER).and_then(Value::as_str) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => {
                tracing::warn!("Gemini response carried no reply text, using placeholder");
                NO_RESPONSE_PLACEHOLDER.to_string()
            }
        }
    }
}

impl Default for GeminiBackend {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, String::new())
    }
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        tracing::debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "Sending completion request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::build_body(prompt))
            .send()
            .await?;

        // Check for HTTP errors
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Gemini returned an error status");
            return Err(BackendError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let data: Value = serde_json::from_str(&text)?;

        Ok(Self::extract_reply(&data))
    }
}
