//! Application state and event handling for Gemchat
//!
//! The interactive loop is modeled as a state machine: user input becomes a
//! typed `Action`, a pure `apply` function maps the current `AppState` and
//! the action to the next state plus a list of `Effect`s, and the loop
//! handler executes the effects (store and model calls) afterward. Actions
//! carry any freshly generated ids and the configured default title so
//! `apply` stays deterministic.

use crate::store::ChatMessage;

/// In-memory view of the running conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// Id of the session new prompts land in
    pub active_session: String,
    /// Messages of the active session, oldest first
    pub messages: Vec<ChatMessage>,
}

impl AppState {
    /// Create a state positioned on the given session with no loaded messages
    pub fn new(active_session: impl Into<String>) -> Self {
        Self {
            active_session: active_session.into(),
            messages: Vec::new(),
        }
    }
}

/// A user intention, parsed from REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start a fresh conversation; `id` is pre-generated by the caller and
    /// `title` is the configured default
    NewSession { id: String, title: String },
    /// Make an existing session active (id already resolved to a full one)
    SwitchSession { id: String },
    /// Retitle the active session
    RenameSession { title: String },
    /// Delete a session; the replacement fields are used when the target is
    /// the active session and a fresh one must take its place
    DeleteSession {
        id: String,
        replacement_id: String,
        replacement_title: String,
    },
    /// Send a prompt to the model in the active session
    SubmitPrompt { prompt: String },
}

/// A side effect the loop handler must execute after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Insert a session row (idempotent)
    CreateSession { id: String, title: String },
    /// Load the stored transcript into `AppState::messages`
    LoadHistory { id: String },
    /// Persist a new title
    Rename { id: String, title: String },
    /// Remove a session and its messages
    Delete { id: String },
    /// Run a full chat turn (model call plus persistence)
    RunTurn { id: String, prompt: String },
}

/// Compute the next state and the effects an action demands
///
/// Pure: no I/O, no clock, no randomness. The user's own prompt is appended
/// to the in-memory transcript optimistically; the assistant reply is added
/// by the handler once the `RunTurn` effect completes.
pub fn apply(state: AppState, action: Action) -> (AppState, Vec<Effect>) {
    match action {
        Action::NewSession { id, title } => {
            let next = AppState::new(id.clone());
            let effects = vec![Effect::CreateSession { id, title }];
            (next, effects)
        }

        Action::SwitchSession { id } => {
            let next = AppState::new(id.clone());
            let effects = vec![Effect::LoadHistory { id }];
            (next, effects)
        }

        Action::RenameSession { title } => {
            let effects = vec![Effect::Rename {
                id: state.active_session.clone(),
                title,
            }];
            (state, effects)
        }

        Action::DeleteSession {
            id,
            replacement_id,
            replacement_title,
        } => {
            if id == state.active_session {
                // Deleting the conversation we are in: spawn a fresh one so
                // the loop always has somewhere to put the next prompt.
                let next = AppState::new(replacement_id.clone());
                let effects = vec![
                    Effect::Delete { id },
                    Effect::CreateSession {
                        id: replacement_id,
                        title: replacement_title,
                    },
                ];
                (next, effects)
            } else {
                (state, vec![Effect::Delete { id }])
            }
        }

        Action::SubmitPrompt { prompt } => {
            if prompt.trim().is_empty() {
                return (state, Vec::new());
            }

            let mut next = state;
            next.messages.push(ChatMessage::user(prompt.clone()));
            let effects = vec![Effect::RunTurn {
                id: next.active_session.clone(),
                prompt,
            }];
            (next, effects)
        }
    }
}
