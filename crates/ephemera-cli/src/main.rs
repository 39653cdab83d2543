//! Ephemera CLI - encrypted, self-destructing notes
//!
//! This is the command-line interface for Ephemera. It exposes the note
//! lifecycle and access-control engine of `ephemera-core` as subcommands.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    // An unreadable config is reported by the command that needs it.
    let config_level = ctx
        .config()
        .ok()
        .flatten()
        .and_then(|config| config.logging.level.clone());
    if let Err(err) = logging::init(config_level.as_deref()) {
        CliError::from_anyhow(&err).exit();
    }

    // Key problems are fatal before the command does any work.
    if cli.command.needs_server_key() {
        if let Err(err) = ctx.cipher() {
            CliError::from_anyhow(&err).exit();
        }
    }

    if let Err(err) = run(&ctx) {
        tracing::debug!(error = ?err, "command failed");
        CliError::from_anyhow(&err).exit();
    }
}

fn run(ctx: &AppContext) -> anyhow::Result<()> {
    match &ctx.cli().command {
        Commands::Init(args) => commands::init::handle_init(ctx, args),
        Commands::Keygen => {
            commands::init::handle_keygen();
            Ok(())
        }
        Commands::Create(args) => commands::notes::handle_create(ctx, args),
        Commands::Status(args) => commands::notes::handle_status(ctx, args),
        Commands::View(args) => commands::notes::handle_view(ctx, args),
        Commands::Unlock(args) => commands::notes::handle_unlock(ctx, args),
        Commands::Edit(args) => commands::notes::handle_edit(ctx, args),
        Commands::Delete { id } => commands::notes::handle_delete(ctx, id),
        Commands::List { json } => commands::notes::handle_list(ctx, *json),
        Commands::Purge => commands::maintenance::handle_purge(ctx),
        Commands::Check => commands::maintenance::handle_check(ctx),
        Commands::Account(command) => commands::accounts::handle_account(ctx, command),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "ephemera", &mut std::io::stdout());
            Ok(())
        }
    }
}
