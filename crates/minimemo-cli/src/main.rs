//! minimemo CLI - notes and schedules from the terminal
//!
//! `minimemo watch` keeps the process alive so each schedule's meeting link
//! opens when it starts.

mod actions;
mod calendar;
mod cli;
mod commands;
mod config;
mod error;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::common::AppContext;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("minimemo=info,minimemo_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell, output }) = &cli.command {
        return commands::completions::run_completions(*shell, output.as_deref());
    }

    let ctx = AppContext::load(cli.data_dir)?;

    match cli.command {
        Some(Commands::Note { command }) => commands::note::run_note(&ctx, command)?,
        Some(Commands::Schedule { command }) => commands::schedule::run_schedule(&ctx, command)?,
        Some(Commands::Sync) => commands::sync::run_sync(&ctx).await?,
        Some(Commands::Auth { command }) => commands::auth::run_auth(&ctx, command)?,
        Some(Commands::Reset { yes }) => commands::reset::run_reset(&ctx, yes)?,
        Some(Commands::Watch { sync_every }) => {
            commands::watch::run_watch(&ctx, sync_every).await?;
        }
        Some(Commands::Config { command }) => commands::config::run_config(&ctx, command)?,
        Some(Commands::Completions { .. }) => {}
        None => {
            // Quick capture mode: minimemo "my note"
            if cli.note.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                commands::note::run_note_add(&ctx, &cli.note)?;
            }
        }
    }

    Ok(())
}
