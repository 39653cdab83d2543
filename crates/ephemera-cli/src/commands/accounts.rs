//! Account command handlers.

use crate::app::AppContext;
use crate::cli::AccountCommand;
use crate::constants::{ENV_NEW_PASSWORD, ENV_PASSWORD};
use crate::errors::CliError;
use crate::helpers::{read_new_secret, read_secret};
use crate::output::{print_account_stats, print_json};

pub fn handle_account(ctx: &AppContext, command: &AccountCommand) -> anyhow::Result<()> {
    match command {
        AccountCommand::Register { email, name } => handle_register(ctx, email, name.as_deref()),
        AccountCommand::Password => handle_password(ctx),
        AccountCommand::Profile { name } => handle_profile(ctx, name),
        AccountCommand::Stats { json } => handle_stats(ctx, *json),
    }
}

fn handle_register(ctx: &AppContext, email: &str, name: Option<&str>) -> anyhow::Result<()> {
    let accounts = ctx.accounts()?;
    let password = read_new_secret(ENV_PASSWORD, "Account password")?;
    let account = accounts.register(email, &password, name)?;
    if !ctx.quiet() {
        println!("Registered {}", account.email);
    }
    Ok(())
}

fn handle_password(ctx: &AppContext) -> anyhow::Result<()> {
    let Some(email) = ctx.cli().user.as_deref() else {
        return Err(CliError::invalid_input("This command requires --user <EMAIL>").into());
    };
    let accounts = ctx.accounts()?;
    let current = read_secret(ENV_PASSWORD, "Current password")?;
    let account = accounts.authenticate(email, &current)?;
    let new = read_new_secret(ENV_NEW_PASSWORD, "New password")?;
    accounts.change_password(&account.id, &current, &new)?;
    if !ctx.quiet() {
        println!("Password changed for {}", account.email);
    }
    Ok(())
}

fn handle_profile(ctx: &AppContext, name: &str) -> anyhow::Result<()> {
    let account = ctx.require_account()?;
    let updated = ctx.accounts()?.update_name(&account.id, name)?;
    if !ctx.quiet() {
        match &updated.name {
            Some(name) => println!("Display name set to {}", name),
            None => println!("Display name cleared"),
        }
    }
    Ok(())
}

fn handle_stats(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let account = ctx.require_account()?;
    let stats = ctx.accounts()?.stats(&account.id)?;
    if json {
        print_json(&stats)?;
    } else {
        print_account_stats(&account.email, &stats);
    }
    Ok(())
}
