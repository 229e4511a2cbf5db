//! Command-line interface definitions for Gemchat

use clap::{Parser, Subcommand};

/// Terminal chat client for Gemini with persistent conversation sessions
#[derive(Parser, Debug)]
#[command(name = "gemchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the session database path
    #[arg(long)]
    pub storage_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Resume an existing session by id or 8-char prefix
        #[arg(short, long)]
        session: Option<String>,

        /// Override the model for this run
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage stored conversation sessions
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List stored sessions, most recently active first
    List,

    /// Print a session's transcript
    Show {
        /// Session id or 8-char prefix
        id: String,
    },

    /// Rename a session
    Rename {
        /// Session id or 8-char prefix
        id: String,
        /// New title
        title: String,
    },

    /// Delete a session and its messages
    Delete {
        /// Session id or 8-char prefix
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chat_with_session() {
        let cli = Cli::parse_from(["gemchat", "chat", "--session", "abcd1234"]);
        match cli.command {
            Commands::Chat { session, model } => {
                assert_eq!(session.as_deref(), Some("abcd1234"));
                assert!(model.is_none());
            }
            _ => panic!("Expected chat command"),
        }
    }

    #[test]
    fn test_parse_history_list() {
        let cli = Cli::parse_from(["gemchat", "history", "list"]);
        assert!(matches!(
            cli.command,
            Commands::History {
                command: HistoryCommand::List
            }
        ));
    }

    #[test]
    fn test_parse_history_rename() {
        let cli = Cli::parse_from(["gemchat", "history", "rename", "abcd1234", "New Title"]);
        match cli.command {
            Commands::History {
                command: HistoryCommand::Rename { id, title },
            } => {
                assert_eq!(id, "abcd1234");
                assert_eq!(title, "New Title");
            }
            _ => panic!("Expected history rename command"),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::parse_from(["gemchat", "history", "list"]);
        assert_eq!(cli.config, "config/config.yaml");
        assert!(!cli.verbose);
    }
}
