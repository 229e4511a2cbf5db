use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a conversation message
///
/// Only two roles exist in a stored conversation: the user's prompts and
/// the model's replies. The Gemini API uses a different vocabulary for the
/// assistant side (`model`), so the wire name is exposed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A prompt typed by the user
    User,
    /// A reply produced by the model (or an error standing in for one)
    Assistant,
}

impl Role {
    /// The role string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// The role string expected by the Gemini generateContent API
    ///
    /// # Examples
    ///
    /// ```
    /// use gemchat::store::Role;
    ///
    /// assert_eq!(Role::User.api_str(), "user");
    /// assert_eq!(Role::Assistant.api_str(), "model");
    /// ```
    pub fn api_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "model",
        }
    }

    /// Parse a role from its stored string form
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("Unknown message role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced this message
    pub role: Role,
    /// Message text (non-empty by contract)
    pub content: String,
}

impl ChatMessage {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use gemchat::store::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::user("Hello!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Metadata for a stored conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    /// Unique identifier for the session (UUID v4)
    pub id: String,
    /// User-friendly title (or generated summary)
    pub title: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session last received a message or rename
    pub updated_at: DateTime<Utc>,
    /// Number of messages in the session
    pub message_count: usize,
}
