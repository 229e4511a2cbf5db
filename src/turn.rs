//! Chat turn orchestration for Gemchat
//!
//! A turn takes a user prompt, builds the transcript the model should see,
//! calls the provider, and persists both sides of the exchange. Provider
//! failures never escape a turn; they become an assistant-visible error
//! message so the conversation (and its history) stays intact.

use crate::provider::Provider;
use crate::store::{ChatMessage, ChatStore};

/// Prompt template used to derive a short session title
const TITLE_PROMPT: &str = "Summarize this into 2 words: ";

/// Result of one completed chat turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The assistant message produced (a reply, or an error rendering)
    pub assistant: ChatMessage,
    /// Newly generated session title, when this was the first exchange
    pub new_title: Option<String>,
}

/// Build the transcript to send to the model
///
/// Appends `prompt` as a trailing user turn unless the last history entry
/// already carries exactly that content. The guard only inspects the final
/// entry's content, not its role; resubmitting the same text immediately is
/// treated as a duplicate regardless of who said it last.
pub fn build_transcript(history: &[ChatMessage], prompt: &str) -> Vec<ChatMessage> {
    let mut transcript = history.to_vec();

    let is_duplicate = history
        .last()
        .map(|m| m.content == prompt)
        .unwrap_or(false);

    if !is_duplicate {
        transcript.push(ChatMessage::user(prompt));
    }

    transcript
}

/// Strip surrounding double quotes and whitespace from a generated title
fn clean_title(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

/// Run one chat turn against a session
///
/// Loads the stored history, sends the transcript to the provider, persists
/// the user prompt followed by the assistant reply, and on the session's
/// first exchange asks the model for a two-word title.
///
/// Provider failures are rendered as an assistant message beginning with
/// `"Error: "` and persisted like any reply; a failed title call is logged
/// and leaves the existing title untouched.
///
/// # Arguments
///
/// * `store` - Session storage
/// * `provider` - Completion provider
/// * `session_id` - Target session (must already exist)
/// * `prompt` - The user's input, non-empty by contract
pub async fn run_turn(
    store: &ChatStore,
    provider: &dyn Provider,
    session_id: &str,
    prompt: &str,
) -> TurnOutcome {
    let history = store.session_history(session_id);
    let first_exchange = history.is_empty();

    let transcript = build_transcript(&history, prompt);

    let assistant = match provider.generate(&transcript).await {
        Ok(reply) => ChatMessage::assistant(reply),
        Err(e) => {
            tracing::error!("Model call failed for session {}: {}", session_id, e);
            ChatMessage::assistant(format!("Error: {}", e))
        }
    };

    store.add_message(session_id, crate::store::Role::User, prompt);
    store.add_message(session_id, assistant.role, &assistant.content);

    let new_title = if first_exchange {
        generate_title(store, provider, session_id, prompt).await
    } else {
        None
    };

    TurnOutcome {
        assistant,
        new_title,
    }
}

/// Ask the model for a short title and persist it
///
/// Returns None (and logs) when the call fails or yields an empty title.
async fn generate_title(
    store: &ChatStore,
    provider: &dyn Provider,
    session_id: &str,
    prompt: &str,
) -> Option<String> {
    let request = vec![ChatMessage::user(format!("{}{}", TITLE_PROMPT, prompt))];

    match provider.generate(&request).await {
        Ok(raw) => {
            let title = clean_title(&raw);
            if title.is_empty() {
                tracing::warn!("Title generation returned empty text for {}", session_id);
                return None;
            }
            store.update_session_title(session_id, &title);
            tracing::debug!("Titled session {} as {:?}", session_id, title);
            Some(title)
        }
        Err(e) => {
            tracing::warn!("Title generation failed for {}: {}", session_id, e);
            None
        }
    }
}
