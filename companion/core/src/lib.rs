//! Companion Core - Headless conversation logic for the companion chat
//!
//! This crate holds everything the chat needs that is not drawing pixels:
//! the conversation state, the remote completion client and the mapping of
//! failures to user-facing text. Any surface (the terminal UI, a test
//! harness, a headless script) drives it the same way.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 UI Surface                   │
//! │   submit / edit input        render updates  │
//! └───────┬──────────────────────────▲───────────┘
//!         │                          │ SessionUpdate
//! ┌───────▼──────────────────────────┴───────────┐
//! │                 ChatSession                  │
//! │  ┌──────────────┐   ┌──────────────────────┐ │
//! │  │ Conversation │   │ loading flag / input │ │
//! │  └──────────────┘   └──────────────────────┘ │
//! └───────┬──────────────────────────▲───────────┘
//!         │ prompt                   │ reply or BackendError
//! ┌───────▼──────────────────────────┴───────────┐
//! │        CompletionBackend (GeminiBackend)     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use companion_core::{load_config, ChatSession, GeminiBackend, SessionConfig};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let (tx, mut rx) = mpsc::channel(config.update_buffer);
//!
//!     let backend = GeminiBackend::from_config(&config);
//!     let mut session = ChatSession::new(backend, SessionConfig::from(&config), tx);
//!     session.start().await;
//!
//!     session.submit("How do I wind down after work?").await;
//!     session.settle().await;
//!
//!     while let Ok(update) = rx.try_recv() {
//!         println!("{update:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: completion backend trait and the Gemini HTTP client
//! - [`config`]: TOML/env/CLI configuration loading
//! - [`conversation`]: append-only message history
//! - [`messages`]: message types and session-to-surface updates
//! - [`notice`]: classification of failures into user-facing text
//! - [`session`]: the conversation state manager
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod conversation;
pub mod messages;
pub mod notice;
pub mod session;

// Re-exports for convenience
pub use backend::{BackendError, CompletionBackend, GeminiBackend, NO_RESPONSE_PLACEHOLDER};
pub use config::{
    default_config_path, default_log_path, load_config, load_config_from_path, CompanionConfig,
    CompanionToml, ConfigError, ConfigOverrides, ConfigSource,
};
pub use conversation::Conversation;
pub use messages::{Message, MessageId, MessageRole, SessionId, SessionUpdate};
pub use notice::FailureNotice;
pub use session::{ChatSession, SessionConfig};
