//! Provider seam for Gemchat
//!
//! This module defines the `Provider` trait the turn orchestrator talks to,
//! along with the structured `ProviderError` kinds a model call can fail
//! with. The orchestrator pattern-matches on the error kind instead of
//! treating every failure as an opaque string.

use crate::store::ChatMessage;
use async_trait::async_trait;
use thiserror::Error;

pub mod gemini;
pub use gemini::GeminiProvider;

/// Failure kinds for a model call
///
/// Every variant renders to a human-readable message; the orchestrator
/// turns that rendering into an assistant-visible error message, so the
/// `Display` text is user-facing.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No API key was configured at startup
    ///
    /// Startup never fails on a missing key; this error surfaces on the
    /// first attempted send instead.
    #[error("No API key configured. Set GEMINI_API_KEY and restart.")]
    Disabled,

    /// Connection, DNS, or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected credentials (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Quota exhausted (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Any other non-success API status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response parsed but did not contain usable text
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Trait for completion providers
///
/// The one operation the chat loop needs: turn a transcript into a reply.
///
/// # Examples
///
/// ```no_run
/// use gemchat::provider::{Provider, ProviderResult};
/// use gemchat::store::ChatMessage;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn generate(&self, transcript: &[ChatMessage]) -> ProviderResult<String> {
///         Ok(transcript.last().map(|m| m.content.clone()).unwrap_or_default())
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate a reply for the given transcript
    ///
    /// # Arguments
    ///
    /// * `transcript` - Full conversation so far, oldest first, ending with
    ///   the user turn to answer
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` describing what went wrong; callers decide
    /// whether to surface, retry, or swallow it.
    async fn generate(&self, transcript: &[ChatMessage]) -> ProviderResult<String>;
}
