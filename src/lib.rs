//! # Gemchat
//!
//! A terminal chat client for Google's Gemini models with persistent
//! conversation sessions backed by SQLite.
//!
//! ## Architecture
//!
//! - [`store`] - Session and message persistence (rusqlite)
//! - [`provider`] - The model seam and the Gemini `generateContent` client
//! - [`turn`] - One chat turn: transcript, model call, persistence, titling
//! - [`app`] - Typed actions, pure state transitions, and side-effect lists
//! - [`commands`] - The interactive REPL and the `history` subcommand
//! - [`config`] - YAML configuration with env and CLI overrides

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod provider;
pub mod store;
pub mod turn;

pub use config::Config;
pub use error::{GemchatError, Result};
