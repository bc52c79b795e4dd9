//! Chat Session
//!
//! The conversation state manager. A session owns the message history, the
//! text the user is composing and the loading flag, and it is the only thing
//! that mutates them.
//!
//! # Flow
//!
//! 1. [`ChatSession::submit`] appends the user's message, clears the input,
//!    raises the loading flag and hands the prompt to the backend on a
//!    spawned task.
//! 2. The surface keeps rendering and calls [`ChatSession::poll_reply`] each
//!    frame (or [`ChatSession::settle`] when it has nothing else to do).
//! 3. When the backend settles, the reply (or a [`FailureNotice`]) is
//!    appended and the loading flag drops.
//!
//! Every append is followed by a [`SessionUpdate::ScrollToLatest`] so the
//! surface keeps the newest message in view. While the flag is up, further
//! submits are ignored, so at most one request is ever in flight.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::backend::{BackendError, CompletionBackend};
use crate::config::{CompanionConfig, DEFAULT_GREETING};
use crate::conversation::Conversation;
use crate::messages::{Message, SessionId, SessionUpdate};
use crate::notice::FailureNotice;

/// Outcome of one completion call
type Reply = Result<String, BackendError>;

/// Per-session settings
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Opening message shown before the user types anything
    pub greeting: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }
}

impl SessionConfig {
    /// Session without a greeting
    #[must_use]
    pub fn silent() -> Self {
        Self { greeting: None }
    }
}

impl From<&CompanionConfig> for SessionConfig {
    fn from(config: &CompanionConfig) -> Self {
        Self {
            greeting: config.greeting.clone().filter(|g| !g.trim().is_empty()),
        }
    }
}

/// Conversation state manager for a single session
pub struct ChatSession<B: CompletionBackend + 'static> {
    /// Completion backend, shared with the in-flight request task
    backend: Arc<B>,
    /// Session settings
    config: SessionConfig,
    /// Message history
    conversation: Conversation,
    /// Text the user is composing
    input: String,
    /// True from submit until the request settles
    loading: bool,
    /// Whether the greeting has been posted
    started: bool,
    /// Receiver for the in-flight request's outcome
    pending: Option<oneshot::Receiver<Reply>>,
    /// Channel to the surface
    tx: mpsc::Sender<SessionUpdate>,
}

impl<B: CompletionBackend + 'static> ChatSession<B> {
    /// Create a new session
    pub fn new(backend: B, config: SessionConfig, tx: mpsc::Sender<SessionUpdate>) -> Self {
        Self::with_shared_backend(Arc::new(backend), config, tx)
    }

    /// Create a session around an already shared backend
    pub fn with_shared_backend(
        backend: Arc<B>,
        config: SessionConfig,
        tx: mpsc::Sender<SessionUpdate>,
    ) -> Self {
        Self {
            backend,
            config,
            conversation: Conversation::new(),
            input: String::new(),
            loading: false,
            started: false,
            pending: None,
            tx,
        }
    }

    /// Post the greeting, if one is configured
    ///
    /// Only the first call has any effect.
    pub async fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        tracing::info!(
            session_id = %self.conversation.id(),
            backend = self.backend.name(),
            "Session started"
        );

        if let Some(greeting) = self.config.greeting.clone() {
            self.append(Message::assistant(greeting)).await;
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Text the user is composing
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the pending input. Ignored while loading.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        if self.loading {
            return false;
        }
        self.input = text.into();
        true
    }

    /// Append a character to the pending input. Ignored while loading.
    pub fn push_input(&mut self, c: char) -> bool {
        if self.loading {
            return false;
        }
        self.input.push(c);
        true
    }

    /// Remove the last character of the pending input. Ignored while loading.
    pub fn pop_input(&mut self) -> Option<char> {
        if self.loading {
            return None;
        }
        self.input.pop()
    }

    /// Whether a submit right now would be accepted
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    // =========================================================================
    // Submit / settle
    // =========================================================================

    /// Submit the pending input
    pub async fn submit_input(&mut self) -> bool {
        let text = self.input.clone();
        self.submit(&text).await
    }

    /// Submit `text` to the backend
    ///
    /// Returns `false` without doing anything if `text` is blank or a request
    /// is already in flight. Otherwise the user message is appended verbatim,
    /// the pending input is cleared and the request is dispatched.
    pub async fn submit(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if self.loading {
            tracing::debug!(session_id = %self.conversation.id(), "Submit ignored, request in flight");
            return false;
        }

        self.append(Message::user(text)).await;
        self.input.clear();
        self.set_loading(true).await;
        self.dispatch(text.to_string());
        true
    }

    /// Apply the in-flight request's outcome if it has arrived
    ///
    /// Never blocks. Returns `true` if an outcome was applied.
    pub async fn poll_reply(&mut self) -> bool {
        let Some(rx) = self.pending.as_mut() else {
            return false;
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => Err(Self::lost_reply()),
        };

        self.pending = None;
        self.finish(outcome).await;
        true
    }

    /// Wait for the in-flight request, if any, and apply its outcome
    ///
    /// Returns `true` if an outcome was applied.
    pub async fn settle(&mut self) -> bool {
        let Some(rx) = self.pending.take() else {
            return false;
        };

        let outcome = rx.await.unwrap_or_else(|_| Err(Self::lost_reply()));
        self.finish(outcome).await;
        true
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Whether a request is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The conversation so far
    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// All messages, oldest first
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Session ID
    #[must_use]
    pub fn id(&self) -> &SessionId {
        self.conversation.id()
    }

    /// The backend this session talks to
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run the completion on its own task
    fn dispatch(&mut self, prompt: String) {
        tracing::info!(
            session_id = %self.conversation.id(),
            prompt_len = prompt.len(),
            "Dispatching completion request"
        );

        let (reply_tx, reply_rx) = oneshot::channel();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let outcome = backend.complete(&prompt).await;
            // Receiver is gone if the session ended first; nothing to do.
            let _ = reply_tx.send(outcome);
        });
        self.pending = Some(reply_rx);
    }

    /// Append the reply or the mapped failure, then drop the loading flag
    async fn finish(&mut self, outcome: Reply) {
        let message = match outcome {
            Ok(reply) => {
                tracing::info!(
                    session_id = %self.conversation.id(),
                    reply_len = reply.len(),
                    "Completion received"
                );
                Message::assistant(reply)
            }
            Err(e) => {
                let notice = FailureNotice::classify(&e);
                tracing::warn!(
                    session_id = %self.conversation.id(),
                    error = %e,
                    notice = ?notice,
                    "Completion failed"
                );
                Message::assistant(notice.text())
            }
        };

        self.loading = false;
        self.append(message).await;
        self.send(SessionUpdate::Loading { active: false }).await;
    }

    async fn set_loading(&mut self, active: bool) {
        self.loading = active;
        self.send(SessionUpdate::Loading { active }).await;
    }

    /// Append a message and ask the surface to scroll to it
    async fn append(&mut self, message: Message) {
        let id = message.id.clone();
        self.conversation.push(message.clone());
        self.send(SessionUpdate::MessageAppended(message)).await;
        self.send(SessionUpdate::ScrollToLatest { id }).await;
    }

    async fn send(&self, update: SessionUpdate) {
        if self.tx.send(update).await.is_err() {
            tracing::debug!(session_id = %self.conversation.id(), "Surface gone, update dropped");
        }
    }

    fn lost_reply() -> BackendError {
        BackendError::Other("completion task ended without a reply".to_string())
    }
}
