//! Server key loading and key file management.

use std::path::Path;

use zeroize::Zeroizing;

use ephemera_core::{NoteError, ServerKey};

use crate::config::EphemeraConfig;
use crate::constants::ENV_KEY;

/// Resolve the server key: `EPHEMERA_KEY` first, then the configured key file.
pub fn load_server_key(config: Option<&EphemeraConfig>) -> anyhow::Result<ServerKey> {
    if let Ok(value) = std::env::var(ENV_KEY) {
        let value = Zeroizing::new(value);
        if !value.trim().is_empty() {
            return Ok(ServerKey::from_base64(&value)?);
        }
    }

    let key_file = config.and_then(|config| config.encryption.key_file.as_deref());
    match key_file {
        Some(path) => read_key_file(Path::new(path)),
        None => Err(NoteError::Crypto(format!(
            "No server key configured; set {} or a key_file in the config",
            ENV_KEY
        ))
        .into()),
    }
}

pub fn read_key_file(path: &Path) -> anyhow::Result<ServerKey> {
    let contents = Zeroizing::new(
        std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read key file {}: {}", path.display(), e))?,
    );
    Ok(ServerKey::from_base64(&contents)?)
}

/// Write a new key file readable only by the current user.
pub fn write_key_file(path: &Path, key: &ServerKey) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    if path.exists() {
        return Err(anyhow::anyhow!("Key file already exists: {}", path.display()));
    }
    let encoded = Zeroizing::new(format!("{}\n", key.to_base64()));
    std::fs::write(path, encoded.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write key file {}: {}", path.display(), e))?;
    set_file_permissions(path)?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create key file directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    Ok(())
}

fn set_file_permissions(path: &Path) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}
