//! Custom widgets

pub mod conversation;

pub use conversation::{conversation_lines, ConversationView, ConversationViewState, StyledLine};
