//! Gemchat - Gemini chat CLI with persistent sessions
//!
//! Main entry point for the gemchat application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gemchat::cli::{Cli, Commands};
use gemchat::commands;
use gemchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Mirror a CLI storage override into the env var the store honors,
    // so `ChatStore::new()` picks it up without threading the path around.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("GEMCHAT_HISTORY_DB", db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path);
    }

    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Chat { session, model } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(s) = &session {
                tracing::debug!("Resuming session: {}", s);
            }
            config.apply_cli_overrides(model, cli.storage_path.clone());
            config.validate()?;
            commands::handle_chat(config, session).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            config.apply_cli_overrides(None, cli.storage_path.clone());
            commands::handle_history(config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "gemchat=debug"
    } else {
        "gemchat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
