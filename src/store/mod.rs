//! Session and message persistence for Gemchat
//!
//! Two tables back the whole application: `sessions` holds one row per
//! conversation, `messages` holds the append-only transcript. Each public
//! operation opens its own connection, runs its statements, and closes it;
//! the only multi-statement transactions are the ones the contract demands
//! (message append with recency bump, and session delete).
//!
//! Write operations reduce failures to a logged boolean so a flaky disk
//! never takes down the interactive loop; reads degrade to empty results.

use crate::error::{GemchatError, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

pub mod types;
pub use types::{ChatMessage, Role, SessionRow};

/// Default title assigned to freshly created sessions
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Storage backend for chat sessions and their transcripts
pub struct ChatStore {
    db_path: PathBuf,
}

impl ChatStore {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        // Allow override of the history DB path via environment variable.
        // This makes it easy to point the binary at a test DB or alternate
        // file without changing the user's application data dir.
        if let Ok(override_path) = std::env::var("GEMCHAT_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "gemchat", "gemchat")
            .ok_or_else(|| GemchatError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        let db_path = data_dir.join("chat.db");
        let store = Self { db_path };

        store.init()?;

        Ok(store)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// This is primarily useful for tests where the default application data
    /// directory is not desirable (for example, using a temporary directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use gemchat::store::ChatStore;
    ///
    /// let store = ChatStore::new_with_path("/tmp/test_chat.db").unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| GemchatError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Path to the backing database file
    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| GemchatError::Storage(e.to_string()).into())
    }

    /// Initialize the database schema
    ///
    /// Safe to invoke on every process start; both statements are no-ops
    /// when the tables already exist.
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create sessions table")
        .map_err(|e| GemchatError::Storage(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(session_id)
            )",
            [],
        )
        .context("Failed to create messages table")
        .map_err(|e| GemchatError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Create a session row if one does not already exist
    ///
    /// Idempotent: a second call with the same id is a no-op and does not
    /// alter the title set by the first call. Returns false only when the
    /// underlying write failed; the failure is logged, never raised.
    pub fn create_session(&self, id: &str, title: &str) -> bool {
        match self.try_create_session(id, title) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to create session {}: {}", id, e);
                false
            }
        }
    }

    fn try_create_session(&self, id: &str, title: &str) -> Result<()> {
        let conn = self.open()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT OR IGNORE INTO sessions (session_id, title, created_at, updated_at)
            VALUES (?, ?, ?, ?)",
            params![id, title, now, now],
        )
        .context("Failed to insert session")
        .map_err(|e| GemchatError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Overwrite the title of an existing session
    ///
    /// No-op if the session id is absent. Returns false only on a storage
    /// failure, which is logged.
    pub fn update_session_title(&self, id: &str, title: &str) -> bool {
        match self.try_update_session_title(id, title) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to update title for session {}: {}", id, e);
                false
            }
        }
    }

    fn try_update_session_title(&self, id: &str, title: &str) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "UPDATE sessions SET title = ? WHERE session_id = ?",
            params![title, id],
        )
        .context("Failed to update session title")
        .map_err(|e| GemchatError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Append a message and refresh the session's recency timestamp
    ///
    /// Both statements run in one transaction so the sidebar ordering in
    /// `all_sessions` always reflects the latest append.
    pub fn add_message(&self, id: &str, role: Role, content: &str) -> bool {
        match self.try_add_message(id, role, content) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to add message to session {}: {}", id, e);
                false
            }
        }
    }

    fn try_add_message(&self, id: &str, role: Role, content: &str) -> Result<()> {
        let mut conn = self.open()?;
        let now = Utc::now().to_rfc3339();

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        tx.execute(
            "UPDATE sessions SET updated_at = ? WHERE session_id = ?",
            params![now, id],
        )
        .context("Failed to refresh session timestamp")
        .map_err(|e| GemchatError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO messages (session_id, role, content, created_at)
            VALUES (?, ?, ?, ?)",
            params![id, role.as_str(), content, now],
        )
        .context("Failed to insert message")
        .map_err(|e| GemchatError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Ordered transcript for a session, oldest first
    ///
    /// Returns an empty vector for an unknown session and on read errors
    /// (logged), so callers never have to distinguish the two.
    pub fn session_history(&self, id: &str) -> Vec<ChatMessage> {
        match self.try_session_history(id) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!("Failed to load history for session {}: {}", id, e);
                Vec::new()
            }
        }
    }

    fn try_session_history(&self, id: &str) -> Result<Vec<ChatMessage>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare("SELECT role, content FROM messages WHERE session_id = ? ORDER BY id ASC")
            .context("Failed to prepare statement")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![id], |row| {
                let role: String = row.get(0)?;
                let content: String = row.get(1)?;
                Ok((role, content))
            })
            .context("Failed to query messages")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        let mut messages = Vec::new();
        for row in rows.flatten() {
            let (role, content) = row;
            match Role::parse_str(&role) {
                Ok(role) => messages.push(ChatMessage { role, content }),
                Err(e) => tracing::warn!("Skipping message with {}", e),
            }
        }

        Ok(messages)
    }

    /// All sessions ordered by last activity, most recent first
    ///
    /// This ordering is the contract the session listing depends on.
    /// Returns an empty vector on read errors (logged).
    pub fn all_sessions(&self) -> Vec<SessionRow> {
        match self.try_all_sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!("Failed to list sessions: {}", e);
                Vec::new()
            }
        }
    }

    fn try_all_sessions(&self) -> Result<Vec<SessionRow>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(
                "SELECT s.session_id, s.title, s.created_at, s.updated_at,
                    (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.session_id)
                FROM sessions s
                ORDER BY s.updated_at DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let title: String = row.get(1)?;
                let created_at_str: String = row.get(2)?;
                let updated_at_str: String = row.get(3)?;
                let message_count: i64 = row.get(4)?;

                let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());

                let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());

                Ok(SessionRow {
                    id,
                    title,
                    created_at,
                    updated_at,
                    message_count: message_count as usize,
                })
            })
            .context("Failed to query sessions")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        let mut sessions = Vec::new();
        for s in rows.flatten() {
            sessions.push(s);
        }

        Ok(sessions)
    }

    /// Delete a session and all of its messages
    ///
    /// Messages are removed before the session row inside one transaction,
    /// so no ordering of failures can leave orphaned rows. Idempotent.
    pub fn delete_session(&self, id: &str) -> bool {
        match self.try_delete_session(id) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to delete session {}: {}", id, e);
                false
            }
        }
    }

    fn try_delete_session(&self, id: &str) -> Result<()> {
        let mut conn = self.open()?;

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        tx.execute("DELETE FROM messages WHERE session_id = ?", params![id])
            .context("Failed to delete messages")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        tx.execute("DELETE FROM sessions WHERE session_id = ?", params![id])
            .context("Failed to delete session")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| GemchatError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Resolve a full session id or an 8-char prefix to a full id
    ///
    /// Returns None when nothing matches (or on a read error, logged).
    /// Prefix lookups resolve to the first match in recency order.
    pub fn resolve_session_id(&self, id: &str) -> Option<String> {
        match self.try_resolve_session_id(id) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!("Failed to resolve session id {}: {}", id, e);
                None
            }
        }
    }

    fn try_resolve_session_id(&self, id: &str) -> Result<Option<String>> {
        let conn = self.open()?;

        // Support both full UUID and prefix matching (e.g., first 8 chars)
        let (query, param) = if id.len() == 36 {
            (
                "SELECT session_id FROM sessions WHERE session_id = ?",
                id.to_string(),
            )
        } else {
            (
                "SELECT session_id FROM sessions WHERE session_id LIKE ?
                ORDER BY updated_at DESC LIMIT 1",
                format!("{}%", id),
            )
        };

        conn.query_row(query, params![param], |row| row.get(0))
            .optional()
            .context("Failed to resolve session id")
            .map_err(|e| GemchatError::Storage(e.to_string()).into())
    }
}
