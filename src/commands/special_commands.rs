//! Special commands parser for interactive chat mode
//!
//! Parses the slash commands available inside the chat REPL. Special
//! commands manage sessions (create, switch, rename, delete, list) and the
//! loop itself (status, help, exit); anything else is a prompt for the
//! model. Commands are prefixed with `/` and are case-insensitive in their
//! command word; arguments keep their original casing.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands manage sessions or the loop itself rather than being
/// sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a fresh conversation
    NewSession,

    /// List stored sessions, most recently active first
    ListSessions,

    /// Switch to another session by full id or 8-char prefix
    Switch(String),

    /// Rename the active session
    Rename(String),

    /// Delete a session; None targets the active one
    Delete(Option<String>),

    /// Show the active session id, title, and model
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the model as a prompt.
    None,
}

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None
/// for regular prompts.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not
/// a valid command, or CommandError::MissingArgument for a command that
/// needs an argument it did not get.
///
/// # Examples
///
/// ```
/// use gemchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/new").unwrap();
/// assert_eq!(cmd, SpecialCommand::NewSession);
///
/// let cmd = parse_special_command("/switch abcd1234").unwrap();
/// assert_eq!(cmd, SpecialCommand::Switch("abcd1234".to_string()));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/bogus").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    // Split off the command word; arguments keep their original casing.
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((w, r)) => (w.to_lowercase(), r.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/new" => Ok(SpecialCommand::NewSession),
        "/sessions" | "/list" => Ok(SpecialCommand::ListSessions),

        "/switch" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/switch".to_string(),
                    usage: "/switch <session_id|prefix>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Switch(rest.to_string()))
            }
        }

        "/rename" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/rename".to_string(),
                    usage: "/rename <new title>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Rename(rest.to_string()))
            }
        }

        "/delete" => {
            if rest.is_empty() {
                Ok(SpecialCommand::Delete(None))
            } else {
                Ok(SpecialCommand::Delete(Some(rest.to_string())))
            }
        }

        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        _ if word.starts_with('/') => Err(CommandError::UnknownCommand(word)),

        _ => Ok(SpecialCommand::None),
    }
}

/// Display help text for special commands
///
/// # Examples
///
/// ```
/// use gemchat::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

SESSION MANAGEMENT:
  /new                  - Start a fresh conversation
  /sessions             - List stored sessions, most recent first
  /switch <id|prefix>   - Switch to another session (8-char prefix works)
  /rename <title>       - Rename the current session
  /delete [id|prefix]   - Delete a session (current one if no argument)

SESSION INFORMATION:
  /status               - Show current session id, title, and model
  /help                 - Show this help message
  /?                    - Same as /help

SESSION CONTROL:
  exit                  - Exit interactive mode
  quit                  - Same as exit

NOTES:
  - Command words are case-insensitive
  - Regular text (not starting with /) is sent to the model
  - Deleting the current session starts a fresh one automatically
"#
    );
}
