//! Conversation Messages
//!
//! The message type stored in a conversation, and the updates a session
//! sends to whichever surface is rendering it.
//!
//! Surfaces hold no business logic. They apply [`SessionUpdate`]s in order
//! and render the result.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageRole {
    /// Text typed by the user
    User,
    /// Reply from the remote service, or a notice standing in for one
    Assistant,
}

impl MessageRole {
    /// Whether this role is the user
    #[must_use]
    pub fn is_user(self) -> bool {
        matches!(self, Self::User)
    }
}

/// One turn in the conversation
///
/// Messages are immutable once created; the conversation only ever appends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// Message text, exactly as typed or received
    pub text: String,
    /// Who sent this message
    pub role: MessageRole,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with a fresh ID and the current time
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            role,
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Create a non-user message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    /// Whether the user authored this message
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }
}

/// Updates sent from a [`ChatSession`](crate::ChatSession) to its surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionUpdate {
    /// A message was appended to the conversation
    MessageAppended(Message),

    /// The surface should bring the named message (the newest) into view
    ScrollToLatest {
        /// ID of the newest message
        id: MessageId,
    },

    /// The loading flag changed
    Loading {
        /// True while a request is in flight
        active: bool,
    },
}

/// Unique message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    #[must_use]
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session identifier, used to correlate log lines
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
