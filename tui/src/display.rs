//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from [`SessionUpdate`]s and used for rendering.
//!
//! The TUI is a thin client: it renders what the session tells it to, and
//! the only state it owns is presentation state (scroll position, the
//! loading pulse).

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

use companion_core::{Message, MessageId, MessageRole, SessionUpdate};

/// Time for the loading pulse to move one dot
const PULSE_STEP: Duration = Duration::from_millis(200);

/// Number of dots in the loading indicator
pub const PULSE_DOTS: usize = 3;

/// A rendered conversation message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// The message text
    pub text: String,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for DisplayMessage {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            role: message.role,
            text: message.text,
            timestamp: message.timestamp,
        }
    }
}

impl DisplayMessage {
    /// Whether the user wrote this message
    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    /// Author label shown above the message
    pub fn author(&self) -> &'static str {
        match self.role {
            MessageRole::User => "You",
            MessageRole::Assistant => "Companion",
        }
    }

    /// Local wall-clock time, `HH:MM`
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// Everything the renderer needs
#[derive(Clone, Debug, Default)]
pub struct DisplayState {
    /// Conversation messages in order
    pub messages: Vec<DisplayMessage>,
    /// Whether a request is in flight
    pub loading: bool,
    /// Scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Message the session last asked us to bring into view
    pub latest: Option<MessageId>,
    /// Time spent in the current loading pulse
    pulse_elapsed: Duration,
}

impl DisplayState {
    /// Create an empty display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one update from the session
    pub fn apply(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::MessageAppended(message) => {
                self.messages.push(message.into());
            }
            SessionUpdate::ScrollToLatest { id } => {
                self.scroll_offset = 0;
                self.latest = Some(id);
            }
            SessionUpdate::Loading { active } => {
                self.loading = active;
                self.pulse_elapsed = Duration::ZERO;
            }
        }
    }

    /// Advance animation timers
    pub fn update(&mut self, delta: Duration) {
        if self.loading {
            self.pulse_elapsed += delta;
        }
    }

    /// Index of the dot that is currently lit in the loading indicator
    pub fn pulse_dot(&self) -> usize {
        let steps = self.pulse_elapsed.as_millis() / PULSE_STEP.as_millis();
        usize::try_from(steps).unwrap_or(0) % PULSE_DOTS
    }

    /// Scroll towards older messages, bounded by `max_offset`
    pub fn scroll_up(&mut self, lines: usize, max_offset: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(max_offset);
    }

    /// Scroll towards newer messages
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Jump back to the newest message
    pub fn scroll_to_latest(&mut self) {
        self.scroll_offset = 0;
    }

    /// Whether the view is pinned to the newest message
    pub fn is_following(&self) -> bool {
        self.scroll_offset == 0
    }
}
