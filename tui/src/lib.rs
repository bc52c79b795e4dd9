//! Companion TUI - Terminal chat surface for the companion
//!
//! This crate provides a full-screen terminal UI for a supportive chat
//! with a hosted completion model. All conversation state lives in
//! `companion-core`; this crate only renders it.
//!
//! # Architecture
//!
//! - **App**: Event loop, key handling, layout
//! - **Display**: Presentation state derived from session updates
//! - **Widgets**: Borderless, bottom-anchored conversation view
//! - **Theme**: Calm palette and shared styles

pub mod app;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use display::{DisplayMessage, DisplayState};
