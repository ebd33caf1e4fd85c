//! Kikitori CLI entry point.

use anyhow::Result;
use clap::Parser;
use kikitori::cli::{commands, Cli, Commands};
use kikitori::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("kikitori={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_config_path);
    let mut settings = Settings::load_from(Some(&config_path))?;

    if let Some(dir) = &cli.transcripts_dir {
        settings.transcripts.dir = dir.clone();
    }

    // Execute command
    match cli.command {
        Commands::Fetch { input, print, format, languages } => {
            commands::run_fetch(&input, print, &format, languages, settings).await?;
        }

        Commands::Query { query, n_results, source, contains, json } => {
            commands::run_query(query, n_results, source, contains, json, settings).await?;
        }

        Commands::List => {
            commands::run_list(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
