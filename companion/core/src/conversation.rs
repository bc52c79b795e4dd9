//! Conversation History
//!
//! An append-only, chronologically ordered list of messages. Order of
//! insertion is display order; nothing is ever edited or removed. The
//! conversation lives exactly as long as the session that owns it.

use crate::messages::{Message, SessionId};

/// Append-only message history for one session
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    /// Session this conversation belongs to
    id: SessionId,
    /// Messages in arrival order
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            messages: Vec::new(),
        }
    }

    /// The session this conversation belongs to
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Append a message and return a reference to it
    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// All messages, oldest first
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The newest message
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation has no messages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
