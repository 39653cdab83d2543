//! Maintenance command handlers.

use ephemera_core::NoteStore;

use crate::app::AppContext;
use crate::errors::CliError;

pub fn handle_purge(ctx: &AppContext) -> anyhow::Result<()> {
    let purged = ctx.notes()?.purge_expired()?;
    if ctx.quiet() {
        println!("{}", purged);
    } else {
        println!("Purged {} expired note(s)", purged);
    }
    Ok(())
}

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.store()?;
    match store.check_integrity() {
        Ok(()) => {
            if !ctx.quiet() {
                println!("Integrity check: OK");
                println!("- sqlite integrity: OK");
                println!("- foreign keys: OK");
                println!("- note rows: OK");
                println!("- metadata keys: OK");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Integrity check: FAILED");
            eprintln!("- error: {}", err);
            Err(CliError::integrity_failed(
                "Integrity check failed",
                "Restore the database from a backup before retrying.",
            )
            .into())
        }
    }
}
