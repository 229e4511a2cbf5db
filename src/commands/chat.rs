//! Interactive chat loop for Gemchat
//!
//! Reads lines with rustyline, parses special commands, and drives the
//! state machine in `crate::app`: input becomes an `Action`, `apply`
//! produces the next state plus effects, and this module executes the
//! effects against the store and provider.

use crate::app::{apply, Action, AppState, Effect};
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::provider::{GeminiProvider, Provider};
use crate::store::{ChatStore, Role};
use crate::turn::run_turn;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use uuid::Uuid;

/// Max title width in the /sessions listing
const TITLE_WIDTH: usize = 18;

/// Run the interactive chat session
///
/// # Arguments
///
/// * `config` - Loaded and validated application configuration
/// * `session` - Optional session id (or prefix) to resume
pub async fn handle_chat(config: Config, session: Option<String>) -> Result<()> {
    let store = open_store(&config)?;
    let provider = GeminiProvider::new(config.provider.clone(), Config::api_key())?;

    let mut state = initial_state(&store, session)?;
    store.create_session(&state.active_session, &config.chat.default_title);
    state.messages = store.session_history(&state.active_session);

    print_welcome(&config, &state);
    if !state.messages.is_empty() {
        print_transcript(&state);
    }

    let mut editor = DefaultEditor::new()?;

    loop {
        let readline = editor.readline(&"you> ".bold().to_string());

        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".green());
                break;
            }
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        let command = match parse_special_command(trimmed) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };

        let action = match command {
            SpecialCommand::Exit => {
                println!("{}", "Goodbye!".green());
                break;
            }
            SpecialCommand::Help => {
                print_help();
                continue;
            }
            SpecialCommand::ShowStatus => {
                print_status(&store, &state, &config);
                continue;
            }
            SpecialCommand::ListSessions => {
                print_session_table(&store, &state.active_session);
                continue;
            }
            SpecialCommand::NewSession => Action::NewSession {
                id: Uuid::new_v4().to_string(),
                title: config.chat.default_title.clone(),
            },
            SpecialCommand::Switch(target) => match store.resolve_session_id(&target) {
                Some(id) => Action::SwitchSession { id },
                None => {
                    println!("{}", format!("No session matching '{}'", target).red());
                    continue;
                }
            },
            SpecialCommand::Rename(title) => Action::RenameSession { title },
            SpecialCommand::Delete(target) => {
                let id = match target {
                    Some(target) => match store.resolve_session_id(&target) {
                        Some(id) => id,
                        None => {
                            println!("{}", format!("No session matching '{}'", target).red());
                            continue;
                        }
                    },
                    None => state.active_session.clone(),
                };
                Action::DeleteSession {
                    id,
                    replacement_id: Uuid::new_v4().to_string(),
                    replacement_title: config.chat.default_title.clone(),
                }
            }
            SpecialCommand::None => Action::SubmitPrompt {
                prompt: trimmed.to_string(),
            },
        };

        let (next, effects) = apply(state, action);
        state = execute_effects(next, effects, &store, &provider).await;
    }

    Ok(())
}

/// Open the store at the configured path, or the platform default
fn open_store(config: &Config) -> Result<ChatStore> {
    if config.storage.db_path.is_empty() {
        ChatStore::new()
    } else {
        ChatStore::new_with_path(&config.storage.db_path)
    }
}

/// Pick the session the loop starts in
///
/// A `--session` argument is resolved against the store (full id or
/// prefix); without one, a fresh session is created.
fn initial_state(store: &ChatStore, session: Option<String>) -> Result<AppState> {
    match session {
        Some(target) => match store.resolve_session_id(&target) {
            Some(id) => Ok(AppState::new(id)),
            None => Err(crate::error::GemchatError::Storage(format!(
                "No session matching '{}'",
                target
            ))
            .into()),
        },
        None => Ok(AppState::new(Uuid::new_v4().to_string())),
    }
}

/// Execute the effects an action produced, returning the updated state
async fn execute_effects(
    mut state: AppState,
    effects: Vec<Effect>,
    store: &ChatStore,
    provider: &dyn Provider,
) -> AppState {
    for effect in effects {
        match effect {
            Effect::CreateSession { id, title } => {
                store.create_session(&id, &title);
                if id == state.active_session {
                    println!(
                        "{}",
                        format!("Started new session {}", &id[..8.min(id.len())]).green()
                    );
                }
            }

            Effect::LoadHistory { id } => {
                state.messages = store.session_history(&id);
                println!(
                    "{}",
                    format!(
                        "Switched to session {} ({} messages)",
                        &id[..8.min(id.len())],
                        state.messages.len()
                    )
                    .green()
                );
                print_transcript(&state);
            }

            Effect::Rename { id, title } => {
                if store.update_session_title(&id, &title) {
                    println!("{}", format!("Renamed session to '{}'", title).green());
                } else {
                    println!("{}", "Failed to rename session".red());
                }
            }

            Effect::Delete { id } => {
                if store.delete_session(&id) {
                    println!(
                        "{}",
                        format!("Deleted session {}", &id[..8.min(id.len())]).green()
                    );
                } else {
                    println!("{}", "Failed to delete session".red());
                }
            }

            Effect::RunTurn { id, prompt } => {
                let outcome = run_turn(store, provider, &id, &prompt).await;
                println!("\n{}\n", outcome.assistant.content.trim());
                state.messages.push(outcome.assistant);
                if let Some(title) = outcome.new_title {
                    println!("{}", format!("Session titled '{}'", title).dimmed());
                }
            }
        }
    }

    state
}

/// Print the welcome banner
fn print_welcome(config: &Config, state: &AppState) {
    println!();
    println!("{}", "Gemchat Interactive Chat".bold().cyan());
    println!(
        "Model: {}  Session: {}",
        config.provider.model.cyan(),
        state.active_session[..8.min(state.active_session.len())].cyan()
    );
    println!("Type '/help' for commands, 'exit' to quit.");
    println!();
}

/// Print the loaded transcript of the active session
fn print_transcript(state: &AppState) {
    for message in &state.messages {
        match message.role {
            Role::User => println!("{} {}", "you>".bold(), message.content),
            Role::Assistant => println!("\n{}\n", message.content.trim()),
        }
    }
}

/// Print the active session's id, title, and message count
fn print_status(store: &ChatStore, state: &AppState, config: &Config) {
    let title = store
        .all_sessions()
        .into_iter()
        .find(|s| s.id == state.active_session)
        .map(|s| s.title)
        .unwrap_or_else(|| config.chat.default_title.clone());

    println!();
    println!("Session:  {}", state.active_session.cyan());
    println!("Title:    {}", title);
    println!("Messages: {}", state.messages.len());
    println!("Model:    {}", config.provider.model);
    println!();
}

/// Print all sessions, most recently active first
fn print_session_table(store: &ChatStore, active_id: &str) {
    let sessions = store.all_sessions();

    if sessions.is_empty() {
        println!("{}", "No sessions found.".yellow());
        return;
    }

    println!();
    for session in sessions {
        let marker = if session.id == active_id { "*" } else { " " };
        let title = truncate_title(&session.title);
        println!(
            "{} {}  {:<width$}  {} messages",
            marker.green().bold(),
            session.id[..8.min(session.id.len())].cyan(),
            title,
            session.message_count,
            width = TITLE_WIDTH
        );
    }
    println!();
}

/// Truncate a title for listing display
fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_WIDTH {
        let cut: String = title.chars().take(TITLE_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_truncate_title_short_unchanged() {
        assert_eq!(truncate_title("Rust Basics"), "Rust Basics");
    }

    #[test]
    fn test_truncate_title_long_is_cut_with_ellipsis() {
        let truncated = truncate_title("A very long session title indeed");
        assert_eq!(truncated.chars().count(), TITLE_WIDTH);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_initial_state_without_session_is_fresh_uuid() {
        let dir = tempdir().expect("tempdir");
        let store = ChatStore::new_with_path(dir.path().join("chat.db")).expect("store");
        let state = initial_state(&store, None).expect("state");
        assert_eq!(state.active_session.len(), 36);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_initial_state_resolves_prefix() {
        let dir = tempdir().expect("tempdir");
        let store = ChatStore::new_with_path(dir.path().join("chat.db")).expect("store");
        let full_id = "abcdef12-3456-7890-abcd-ef1234567890";
        store.create_session(full_id, "T");

        let state = initial_state(&store, Some("abcdef12".to_string())).expect("state");
        assert_eq!(state.active_session, full_id);
    }

    #[test]
    fn test_initial_state_unknown_session_errors() {
        let dir = tempdir().expect("tempdir");
        let store = ChatStore::new_with_path(dir.path().join("chat.db")).expect("store");
        assert!(initial_state(&store, Some("ffffffff".to_string())).is_err());
    }
}
