//! Failure Notices
//!
//! Turns a backend failure into one of a fixed set of user-facing messages.
//! Classification looks for a status code inside the error's text, so it
//! works the same for errors raised by any backend, including mocks that
//! only carry a message.

use std::fmt;

use crate::backend::BackendError;

/// User-facing message for each failure class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureNotice {
    /// The service rejected the credential (401)
    Authentication,
    /// The endpoint does not exist (404)
    EndpointNotFound,
    /// The service rejected the request (400)
    InvalidRequest,
    /// Anything else: network, parse, unexpected status
    Connectivity,
}

impl FailureNotice {
    /// Classify a backend error
    #[must_use]
    pub fn classify(error: &BackendError) -> Self {
        Self::from_message(&error.to_string())
    }

    /// Classify a raw error message
    ///
    /// Checked in order: `401`, `404`, `400`.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        if message.contains("401") {
            Self::Authentication
        } else if message.contains("404") {
            Self::EndpointNotFound
        } else if message.contains("400") {
            Self::InvalidRequest
        } else {
            Self::Connectivity
        }
    }

    /// The exact text shown to the user
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::Authentication => "Authentication failed. Please check your API key.",
            Self::EndpointNotFound => "API endpoint not found. Please verify the URL.",
            Self::InvalidRequest => "Invalid request. Please try again.",
            Self::Connectivity => {
                "I'm sorry, I'm having trouble connecting to the service. Please try again later."
            }
        }
    }
}

impl fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
