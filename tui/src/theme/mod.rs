//! Theme and Colors
//!
//! The companion palette: calm greens and lavenders, kept soft so the
//! conversation stays easy on the eyes.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Companion Palette
// ============================================================================

/// Primary accent - sage green (loading pulse, companion name)
pub const COMPANION_PRIMARY: Color = Color::Rgb(126, 190, 160);

/// Secondary accent - muted teal (loading row, hints)
pub const COMPANION_SECONDARY: Color = Color::Rgb(110, 160, 170);

/// Tertiary accent - lavender (title)
pub const COMPANION_TERTIARY: Color = Color::Rgb(170, 150, 220);

/// Light border - pale grey-green
pub const COMPANION_LIGHT: Color = Color::Rgb(150, 170, 160);

// ============================================================================
// UI Colors
// ============================================================================

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Fade shade for the edge lines when there is more content to scroll
pub const FADE_GRAY: Color = Color::Rgb(80, 80, 80);

/// Warning yellow (status bar notes)
pub const WARNING_YELLOW: Color = Color::Rgb(230, 200, 90);

// ============================================================================
// Styles
// ============================================================================

/// Title bar style
#[must_use]
pub fn title_style() -> Style {
    Style::default()
        .fg(COMPANION_TERTIARY)
        .add_modifier(Modifier::BOLD)
}

/// Style for a message's author line
#[must_use]
pub fn author_style(is_user: bool) -> Style {
    let color = if is_user { USER_GREEN } else { COMPANION_PRIMARY };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Style for a message's body
#[must_use]
pub fn body_style(is_user: bool) -> Style {
    if is_user {
        Style::default().fg(USER_GREEN)
    } else {
        Style::default()
    }
}

/// Input box style, dimmed while a request is in flight
#[must_use]
pub fn input_style(enabled: bool) -> Style {
    if enabled {
        Style::default().fg(USER_GREEN)
    } else {
        Style::default().fg(DIM_GRAY)
    }
}
