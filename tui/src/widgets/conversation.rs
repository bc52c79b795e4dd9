//! Conversation Widget
//!
//! A borderless, bottom-anchored scrollable view of the conversation.
//! Scroll offset counts lines up from the newest one, so offset 0 always
//! shows the latest message.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;
use unicode_width::UnicodeWidthChar;

use crate::display::DisplayMessage;
use crate::theme::{author_style, body_style, FADE_GRAY};

/// One wrapped, styled line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledLine {
    /// Line text, already wrapped to the view width
    pub text: String,
    /// Style to draw it with
    pub style: Style,
}

impl StyledLine {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::new(String::new(), Style::default())
    }
}

/// Lay out messages as wrapped lines: author and time, body, blank spacer
pub fn conversation_lines(messages: &[DisplayMessage], width: usize) -> Vec<StyledLine> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for msg in messages {
        let is_user = msg.is_user();
        lines.push(StyledLine::new(
            format!("{} · {}", msg.author(), msg.time_label()),
            author_style(is_user),
        ));

        for paragraph in msg.text.lines() {
            if paragraph.is_empty() {
                lines.push(StyledLine::blank());
                continue;
            }
            for line in wrap(paragraph, width) {
                lines.push(StyledLine::new(line.into_owned(), body_style(is_user)));
            }
        }
        lines.push(StyledLine::blank());
    }

    lines
}

/// Cut `text` to at most `width` terminal columns
fn clip_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

/// State for the conversation view
#[derive(Debug, Default)]
pub struct ConversationViewState {
    /// Scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Total content lines at the last render
    pub total_lines: usize,
    /// Rendered height at the last render
    pub height: usize,
}

impl ConversationViewState {
    /// Largest useful scroll offset for the last rendered layout
    pub fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height)
    }
}

/// Bottom-anchored conversation view
pub struct ConversationView<'a> {
    lines: &'a [StyledLine],
}

impl<'a> ConversationView<'a> {
    /// Create a view over pre-wrapped lines
    pub fn new(lines: &'a [StyledLine]) -> Self {
        Self { lines }
    }
}

impl StatefulWidget for ConversationView<'_> {
    type State = ConversationViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let height = area.height as usize;
        state.total_lines = self.lines.len();
        state.height = height;

        // Clamp scroll
        state.scroll_offset = state.scroll_offset.min(state.max_offset());

        let visible_end = state.total_lines - state.scroll_offset;
        let visible_start = visible_end.saturating_sub(height);

        let has_content_above = visible_start > 0;
        let has_content_below = state.scroll_offset > 0;

        for (i, line) in self.lines[visible_start..visible_end].iter().enumerate() {
            // Fade the edge line when more content is hidden past it
            let style = if (has_content_above && i == 0)
                || (has_content_below && i + 1 == height)
            {
                Style::default().fg(FADE_GRAY)
            } else {
                line.style
            };

            let text = clip_to_width(&line.text, area.width as usize);
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + i as u16;
            buf.set_string(area.x, y, &text, style);
        }
    }
}
