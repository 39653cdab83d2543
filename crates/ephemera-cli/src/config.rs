use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct EphemeraConfig {
    pub database: DatabaseSection,
    pub encryption: EncryptionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptionSection {
    /// File holding the base64 server key
    pub key_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LoggingSection {
    /// Tracing filter directive, e.g. `info` or `ephemera_core=debug`
    pub level: Option<String>,
}

impl EphemeraConfig {
    pub fn new(database_path: &Path, key_file: Option<&Path>) -> Self {
        Self {
            database: DatabaseSection {
                path: database_path.to_string_lossy().to_string(),
            },
            encryption: EncryptionSection {
                key_file: key_file.map(|path| path.to_string_lossy().to_string()),
            },
            logging: LoggingSection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_database_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("notes.db"))
}

pub fn default_key_file_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("server.key"))
}

pub fn read_config(path: &Path) -> anyhow::Result<EphemeraConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &EphemeraConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("ephemera"));
        }
    }
    Ok(home_dir()?.join(".config").join("ephemera"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("ephemera"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("ephemera"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
