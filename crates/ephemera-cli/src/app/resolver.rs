//! Path resolution for config and database files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, EphemeraConfig};
use crate::constants::ENV_CONFIG;
use crate::errors::CliError;

/// Resolve the config file path, checking EPHEMERA_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(ENV_CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config file if one exists.
pub fn load_config() -> anyhow::Result<Option<EphemeraConfig>> {
    let path = resolve_config_path()?;
    if !path.exists() {
        return Ok(None);
    }
    read_config(&path).map(Some)
}

/// Resolve the database path from CLI args or config.
pub fn resolve_database_path(cli: &Cli, config: Option<&EphemeraConfig>) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.db.as_deref() {
        return Ok(PathBuf::from(path));
    }
    match config {
        Some(config) => Ok(PathBuf::from(&config.database.path)),
        None => Err(CliError::not_found(
            missing_config_message(&resolve_config_path()?),
            "Run `ephemera init`, or pass --db (EPHEMERA_DB) together with EPHEMERA_KEY.",
        )
        .into()),
    }
}

/// Error message when the database file is missing.
pub fn missing_database_message(path: &Path) -> String {
    format!("No note database found at {}", path.display())
}

/// Error message when the config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!("No config found at {}", config_path.display())
}
