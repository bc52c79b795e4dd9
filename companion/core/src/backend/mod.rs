//! Completion Backend Integration
//!
//! This module provides access to the remote text-generation service through
//! a small trait, so the session logic can be exercised against mocks.
//!
//! # Available Backends
//!
//! - **Gemini**: Google generative-language `generateContent` endpoint
//!
//! # Usage
//!
//! ```ignore
//! use companion_core::backend::{CompletionBackend, GeminiBackend};
//!
//! let backend = GeminiBackend::new(endpoint, api_key);
//! let reply = backend.complete("Hello!").await?;
//! ```

mod gemini;
mod traits;

pub use gemini::{GeminiBackend, DEFAULT_ENDPOINT, NO_RESPONSE_PLACEHOLDER};
pub use traits::{BackendError, CompletionBackend};
