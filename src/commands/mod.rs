//! Command handlers for Gemchat
//!
//! Each CLI subcommand has a handler module: `chat` runs the interactive
//! loop, `history` manages stored sessions non-interactively, and
//! `special_commands` parses the in-loop slash commands.

pub mod chat;
pub mod history;
pub mod special_commands;

pub use chat::handle_chat;
pub use history::handle_history;
