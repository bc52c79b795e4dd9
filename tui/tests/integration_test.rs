//! Integration Tests for TUI + Session
//!
//! These tests drive the App the way the event loop does (key events, then
//! a frame step) against a mock completion backend, and render into a
//! ratatui `TestBackend` to check what the user actually sees.
//!
//! # Test Coverage
//!
//! 1. **Startup Flow**: greeting shown, input enabled
//! 2. **Message Exchange**: typed message submitted, reply rendered
//! 3. **Loading State**: input locked and indicator shown while waiting
//! 4. **Failures**: backend errors shown as friendly notices

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::sync::{mpsc, Notify};
use tokio::time::timeout;

use companion_core::{
    BackendError, ChatSession, CompletionBackend, FailureNotice, MessageRole, SessionConfig,
};
use companion_tui::App;

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend that echoes prompts and fails on request
///
/// Prompts of the form `status NNN` fail with that HTTP status. When gated,
/// every call waits for the gate to be notified before answering.
struct GatedBackend {
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl GatedBackend {
    fn open() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: Some(gate),
        }
    }
}

#[async_trait]
impl CompletionBackend for GatedBackend {
    fn name(&self) -> &str {
        "gated-mock"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }

        if let Some(code) = prompt.strip_prefix("status ") {
            let status = code.parse().unwrap_or(500);
            return Err(BackendError::Remote {
                status,
                body: "{}".to_string(),
            });
        }
        Ok(format!("You said: {prompt}"))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn app_with(backend: GatedBackend, config: SessionConfig) -> App<GatedBackend> {
    let (tx, rx) = mpsc::channel(100);
    App::new(ChatSession::new(backend, config, tx), rx)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

async fn type_text(app: &mut App<GatedBackend>, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c))).await;
    }
}

/// Step frames until the pending reply has been applied
async fn wait_for_reply(app: &mut App<GatedBackend>) {
    timeout(Duration::from_secs(2), async {
        while app.session().is_loading() {
            app.step().await;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("reply should settle");
    app.step().await;
}

fn render(app: &mut App<GatedBackend>, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
    terminal.draw(|frame| app.draw(frame)).expect("draw");

    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Startup
// ============================================================================

#[tokio::test]
async fn test_startup_shows_greeting_and_title() {
    let mut app = app_with(GatedBackend::open(), SessionConfig::default());
    app.start().await;

    let display = app.display();
    assert_eq!(display.messages.len(), 1);
    assert_eq!(display.messages[0].role, MessageRole::Assistant);
    assert!(display.is_following());
    assert!(!display.loading);

    let screen = render(&mut app, 100, 24);
    assert!(screen.contains("Chat with your Mental Health Copilot"));
    assert!(screen.contains("mental health companion"));
    assert!(screen.contains("Type your message..."));
    assert!(screen.contains("Ready"));
}

#[tokio::test]
async fn test_startup_without_greeting() {
    let mut app = app_with(GatedBackend::open(), SessionConfig::silent());
    app.start().await;
    assert!(app.display().messages.is_empty());
}

// ============================================================================
// Message Exchange
// ============================================================================

#[tokio::test]
async fn test_typed_message_round_trip() {
    let mut app = app_with(GatedBackend::open(), SessionConfig::silent());
    app.start().await;

    type_text(&mut app, "I feel anxious").await;
    assert_eq!(app.session().input(), "I feel anxious");

    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.session().input(), "");
    assert_eq!(app.display().messages.len(), 1);
    assert!(app.display().loading);

    wait_for_reply(&mut app).await;

    let texts: Vec<_> = app
        .display()
        .messages
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(texts, vec!["I feel anxious", "You said: I feel anxious"]);
    assert!(!app.display().loading);
    assert_eq!(
        app.display().latest.as_ref(),
        Some(&app.session().messages()[1].id)
    );

    let screen = render(&mut app, 80, 24);
    assert!(screen.contains("You said: I feel anxious"));
}

#[tokio::test]
async fn test_blank_input_is_not_submitted() {
    let backend = GatedBackend::open();
    let mut app = app_with(backend, SessionConfig::silent());

    type_text(&mut app, "   ").await;
    app.handle_key(key(KeyCode::Enter)).await;

    assert!(app.display().messages.is_empty());
    assert!(!app.session().is_loading());
    assert_eq!(app.session().backend().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_backspace_edits_input() {
    let mut app = app_with(GatedBackend::open(), SessionConfig::silent());
    type_text(&mut app, "hii").await;
    app.handle_key(key(KeyCode::Backspace)).await;
    assert_eq!(app.session().input(), "hi");
}

#[tokio::test]
async fn test_modified_chars_are_not_typed() {
    let mut app = app_with(GatedBackend::open(), SessionConfig::silent());
    type_text(&mut app, "ok").await;

    for modifiers in [KeyModifiers::CONTROL, KeyModifiers::ALT] {
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), modifiers))
            .await;
    }
    app.handle_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT))
        .await;

    assert_eq!(app.session().input(), "okA");
    assert!(app.is_running());
}

// ============================================================================
// Loading State
// ============================================================================

#[tokio::test]
async fn test_input_locked_while_waiting() {
    let gate = Arc::new(Notify::new());
    let mut app = app_with(GatedBackend::gated(Arc::clone(&gate)), SessionConfig::silent());

    type_text(&mut app, "first").await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert!(app.session().is_loading());

    // Typing and a second submit are ignored until the reply lands
    type_text(&mut app, "second").await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.session().input(), "");
    assert_eq!(app.display().messages.len(), 1);

    app.step().await;
    let screen = render(&mut app, 80, 24);
    assert!(screen.contains("Waiting for reply..."));
    assert!(screen.contains('●'));

    gate.notify_one();
    wait_for_reply(&mut app).await;

    assert_eq!(app.session().backend().calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.display().messages.len(), 2);
    assert!(render(&mut app, 80, 24).contains("Ready"));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_failures_render_as_notices() {
    let cases = [
        ("status 401", FailureNotice::Authentication),
        ("status 404", FailureNotice::EndpointNotFound),
        ("status 400", FailureNotice::InvalidRequest),
        ("status 503", FailureNotice::Connectivity),
    ];

    for (prompt, notice) in cases {
        let mut app = app_with(GatedBackend::open(), SessionConfig::silent());
        type_text(&mut app, prompt).await;
        app.handle_key(key(KeyCode::Enter)).await;
        wait_for_reply(&mut app).await;

        let last = app.display().messages.last().expect("notice appended");
        assert_eq!(last.role, MessageRole::Assistant);
        assert_eq!(last.text, notice.text(), "prompt {prompt}");
        assert!(!app.display().loading);
    }
}

// ============================================================================
// Scrolling and Quit
// ============================================================================

#[tokio::test]
async fn test_scrollback_and_new_message_snaps_to_latest() {
    let mut app = app_with(GatedBackend::open(), SessionConfig::silent());

    for i in 0..6 {
        type_text(&mut app, &format!("message number {i}")).await;
        app.handle_key(key(KeyCode::Enter)).await;
        wait_for_reply(&mut app).await;
    }

    // Render once so the view knows its height
    render(&mut app, 60, 16);
    app.handle_key(key(KeyCode::PageUp)).await;
    assert!(!app.display().is_following());

    app.handle_key(key(KeyCode::End)).await;
    assert!(app.display().is_following());

    app.handle_key(key(KeyCode::PageUp)).await;
    type_text(&mut app, "back to now").await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert!(app.display().is_following());
}

#[tokio::test]
async fn test_escape_quits() {
    let mut app = app_with(GatedBackend::open(), SessionConfig::silent());
    assert!(app.is_running());
    app.handle_key(key(KeyCode::Esc)).await;
    assert!(!app.is_running());

    let mut app = app_with(GatedBackend::open(), SessionConfig::silent());
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
        .await;
    assert!(!app.is_running());
}
