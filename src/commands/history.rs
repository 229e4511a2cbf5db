use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::Result;
use crate::store::{ChatStore, Role};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(config: Config, command: HistoryCommand) -> Result<()> {
    let store = if config.storage.db_path.is_empty() {
        ChatStore::new()?
    } else {
        ChatStore::new_with_path(&config.storage.db_path)?
    };

    match command {
        HistoryCommand::List => {
            let sessions = store.all_sessions();

            if sessions.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Messages".bold(),
                "Last Updated".bold()
            ]);

            for session in sessions {
                let id_short = &session.id[..8.min(session.id.len())];
                let title = truncate_listing_title(&session.title);
                let updated = session.updated_at.format("%Y-%m-%d %H:%M").to_string();

                table.add_row(prettytable::row![
                    id_short.cyan(),
                    title,
                    session.message_count,
                    updated
                ]);
            }

            println!("\nConversation History:");
            table.printstd();
            println!();
            println!(
                "Use {} to resume a session.",
                "gemchat chat --session <ID>".cyan()
            );
            println!();
        }

        HistoryCommand::Show { id } => {
            let resolved = store.resolve_session_id(&id).ok_or_else(|| {
                crate::error::GemchatError::Storage(format!("No session matching '{}'", id))
            })?;

            let history = store.session_history(&resolved);
            if history.is_empty() {
                println!("{}", "Session has no messages.".yellow());
                return Ok(());
            }

            println!();
            for message in history {
                match message.role {
                    Role::User => println!("{} {}", "you>".bold(), message.content),
                    Role::Assistant => println!("\n{}\n", message.content.trim()),
                }
            }
        }

        HistoryCommand::Rename { id, title } => {
            let resolved = store.resolve_session_id(&id).ok_or_else(|| {
                crate::error::GemchatError::Storage(format!("No session matching '{}'", id))
            })?;

            let short = &resolved[..8.min(resolved.len())];
            if store.update_session_title(&resolved, &title) {
                println!(
                    "{}",
                    format!("Renamed session {} to '{}'", short, title).green()
                );
            } else {
                println!("{}", "Failed to rename session".red());
            }
        }

        HistoryCommand::Delete { id } => {
            let resolved = store.resolve_session_id(&id).ok_or_else(|| {
                crate::error::GemchatError::Storage(format!("No session matching '{}'", id))
            })?;

            let short = &resolved[..8.min(resolved.len())];
            if store.delete_session(&resolved) {
                println!("{}", format!("Deleted session {}", short).green());
            } else {
                println!("{}", "Failed to delete session".red());
            }
        }
    }

    Ok(())
}

/// Truncate a title for table display, counting chars rather than bytes
fn truncate_listing_title(title: &str) -> String {
    const WIDTH: usize = 40;
    if title.chars().count() > WIDTH {
        let cut: String = title.chars().take(WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}
