use ephemera_core::{ServerKey, SqliteStore};

use crate::app::{read_key_file, resolve_config_path, write_key_file, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_database_path, default_key_file_path, write_config, EphemeraConfig};
use crate::errors::CliError;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        ))
        .into());
    }

    let database_path = match args.path.as_deref().or(ctx.cli().db.as_deref()) {
        Some(path) => path.into(),
        None => default_database_path()?,
    };
    let key_path = match args.key_file.as_deref() {
        Some(path) => path.into(),
        None => default_key_file_path()?,
    };

    // An existing key still decrypts existing notes; never replace it.
    let key_created = if key_path.exists() {
        read_key_file(&key_path)?;
        false
    } else {
        write_key_file(&key_path, &ServerKey::generate())?;
        true
    };

    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    SqliteStore::open(&database_path)?;

    write_config(
        &config_path,
        &EphemeraConfig::new(&database_path, Some(&key_path)),
    )?;

    if !ctx.quiet() {
        println!("Initialized note database at {}", database_path.display());
        if key_created {
            println!("Generated server key at {}", key_path.display());
        } else {
            println!("Using existing server key at {}", key_path.display());
        }
        println!("Wrote config to {}", config_path.display());
    }
    Ok(())
}

pub fn handle_keygen() {
    println!("{}", ServerKey::generate().to_base64());
}
