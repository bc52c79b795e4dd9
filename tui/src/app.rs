//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ChatSession for conversation state and the remote call
//! - DisplayState for rendering
//!
//! Each frame the App:
//! 1. Converts terminal events to session calls (edit input, submit)
//! 2. Lets the session pick up a settled reply
//! 3. Applies SessionUpdates to DisplayState
//! 4. Renders based on DisplayState

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;

use companion_core::{ChatSession, CompletionBackend, SessionUpdate};

use crate::display::{DisplayState, PULSE_DOTS};
use crate::theme::{
    input_style, title_style, COMPANION_LIGHT, COMPANION_PRIMARY, COMPANION_SECONDARY, DIM_GRAY,
    WARNING_YELLOW,
};
use crate::widgets::{conversation_lines, ConversationView, ConversationViewState};

/// Title shown above the conversation
pub const TITLE: &str = "Chat with your Mental Health Copilot";

/// Shown in the empty input box
pub const INPUT_PLACEHOLDER: &str = "Type your message...";

/// Input box height (lines, including border)
const INPUT_HEIGHT: u16 = 5;

/// Lines scrolled per mouse wheel notch
const WHEEL_LINES: usize = 3;

/// Target ~10 FPS for the loading pulse
const FRAME_DURATION: Duration = Duration::from_millis(100);

/// Main application state
pub struct App<B: CompletionBackend + 'static> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Session Integration ===
    /// Conversation state manager
    session: ChatSession<B>,
    /// Updates from the session
    updates: mpsc::Receiver<SessionUpdate>,
    /// Display state derived from SessionUpdates
    display: DisplayState,

    // === UI State ===
    /// Conversation view scroll bookkeeping
    view: ConversationViewState,
    /// Extra note for the status bar (e.g. missing API key)
    status_note: Option<String>,
    /// Last frame time (for animations)
    last_frame: Instant,
}

impl<B: CompletionBackend + 'static> App<B> {
    /// Create a new App around a session and its update channel
    pub fn new(session: ChatSession<B>, updates: mpsc::Receiver<SessionUpdate>) -> Self {
        Self {
            running: true,
            session,
            updates,
            display: DisplayState::new(),
            view: ConversationViewState::default(),
            status_note: None,
            last_frame: Instant::now(),
        }
    }

    /// Add a note to the status bar
    #[must_use]
    pub fn with_status_note(mut self, note: impl Into<String>) -> Self {
        self.status_note = Some(note.into());
        self
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        self.start().await;
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await;
                        }
                        Some(Ok(Event::Mouse(mouse))) => self.handle_mouse(mouse),
                        // Resize is picked up by the next draw
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => self.running = false,
                    }
                }

                // Frame tick
                () = tokio::time::sleep(FRAME_DURATION) => {}
            }

            self.step().await;
            terminal.draw(|frame| self.draw(frame))?;
        }

        tracing::info!(session_id = %self.session.id(), "App loop finished");
        Ok(())
    }

    /// Post the greeting and pick up the resulting updates
    pub async fn start(&mut self) {
        self.session.start().await;
        self.process_updates();
    }

    /// One frame of non-input work: settle replies, apply updates, animate
    pub async fn step(&mut self) {
        self.session.poll_reply().await;
        self.process_updates();

        let now = Instant::now();
        self.display.update(now - self.last_frame);
        self.last_frame = now;
    }

    /// Apply all pending updates from the session
    pub fn process_updates(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            self.display.apply(update);
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            // Quit
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if ctrl => self.running = false,

            // Submit message (ignored while a reply is pending)
            KeyCode::Enter => {
                self.session.submit_input().await;
                self.process_updates();
            }

            // Typing (input is locked while a reply is pending)
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.session.push_input(c);
            }
            KeyCode::Backspace => {
                self.session.pop_input();
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page = self.page_size();
                self.display.scroll_up(page, self.view.max_offset());
            }
            KeyCode::PageDown => {
                let page = self.page_size();
                self.display.scroll_down(page);
            }
            KeyCode::Home if ctrl => {
                let max = self.view.max_offset();
                self.display.scroll_up(max, max);
            }
            KeyCode::End => self.display.scroll_to_latest(),

            _ => {}
        }
    }

    /// Handle mouse input
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.display.scroll_up(WHEEL_LINES, self.view.max_offset());
            }
            MouseEventKind::ScrollDown => self.display.scroll_down(WHEEL_LINES),
            _ => {}
        }
    }

    /// Half the conversation height, at least one line
    fn page_size(&self) -> usize {
        (self.view.height / 2).max(1)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether the event loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// The session driving this app
    pub fn session(&self) -> &ChatSession<B> {
        &self.session
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render the whole UI into a frame
    pub fn draw(&mut self, frame: &mut Frame) {
        let [header, body, loading, input, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!(" {TITLE}"), title_style()))),
            header,
        );
        self.render_conversation(frame, body);
        self.render_loading(frame, loading);
        self.render_input(frame, input);
        self.render_status(frame, status);
    }

    /// Render conversation pane
    fn render_conversation(&mut self, frame: &mut Frame, area: Rect) {
        let inner = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(2),
            ..area
        };
        if inner.width < 10 || inner.height < 1 {
            return;
        }

        let lines = conversation_lines(&self.display.messages, inner.width as usize);

        self.view.scroll_offset = self.display.scroll_offset;
        frame.render_stateful_widget(ConversationView::new(&lines), inner, &mut self.view);
        // Keep the display's offset within what was actually renderable
        self.display.scroll_offset = self.view.scroll_offset;
    }

    /// Render the pulsing dots while waiting, or a hint when scrolled back
    fn render_loading(&self, frame: &mut Frame, area: Rect) {
        let line = if self.display.loading {
            let lit = self.display.pulse_dot();
            let mut spans = vec![Span::raw("  ")];
            for i in 0..PULSE_DOTS {
                let color = if i == lit { COMPANION_PRIMARY } else { DIM_GRAY };
                spans.push(Span::styled("● ", Style::default().fg(color)));
            }
            Line::from(spans)
        } else if !self.display.is_following() {
            Line::from(Span::styled(
                "  ↓ newer messages below (End to jump back)",
                Style::default().fg(COMPANION_SECONDARY),
            ))
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render input box
    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let enabled = !self.session.is_loading();
        let block = Block::bordered()
            .border_style(Style::default().fg(COMPANION_LIGHT))
            .title(if self.session.can_submit() {
                " Message · Enter to send "
            } else {
                " Message "
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text_width = inner.width.saturating_sub(1) as usize;
        let text_height = inner.height as usize;
        if text_width < 5 || text_height < 1 {
            return;
        }

        let lines: Vec<Line> = if self.session.input().is_empty() {
            let cursor = if enabled { "_" } else { "" };
            vec![Line::from(vec![
                Span::styled(cursor, input_style(enabled)),
                Span::styled(INPUT_PLACEHOLDER, Style::default().fg(DIM_GRAY)),
            ])]
        } else {
            let full_input = if enabled {
                format!("{}_", self.session.input())
            } else {
                self.session.input().to_string()
            };
            let wrapped = textwrap::wrap(&full_input, text_width);
            // Keep the tail (where the cursor is) in view
            let skip = wrapped.len().saturating_sub(text_height);
            wrapped
                .into_iter()
                .skip(skip)
                .map(|l| Line::from(Span::styled(l.into_owned(), input_style(enabled))))
                .collect()
        };

        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// Render status bar
    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let state = if self.display.loading {
            "Waiting for reply..."
        } else {
            "Ready"
        };

        let scroll_info = if self.display.scroll_offset > 0 {
            format!(" [^{} lines]", self.display.scroll_offset)
        } else {
            String::new()
        };

        let mut spans = vec![Span::styled(
            format!(" {state} | Esc to quit | PgUp/PgDn scroll{scroll_info}"),
            Style::default().fg(DIM_GRAY),
        )];
        if let Some(ref note) = self.status_note {
            spans.push(Span::styled(
                format!(" | {note}"),
                Style::default().fg(WARNING_YELLOW),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
