//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read};
use std::process::Command;

use dialoguer::Password;
use uuid::Uuid;

use crate::errors::CliError;

/// Read a secret from an env var, or prompt for it on a TTY.
pub fn read_secret(env_var: &str, prompt: &str) -> anyhow::Result<String> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Ok(value);
        }
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {}.",
            env_var
        ))
        .into());
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Like [`read_secret`], but interactive entry must be confirmed.
pub fn read_new_secret(env_var: &str, prompt: &str) -> anyhow::Result<String> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Ok(value);
        }
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {}.",
            env_var
        ))
        .into());
    }
    Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for a note password on a TTY.
pub fn prompt_note_password(confirm: bool) -> anyhow::Result<String> {
    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(
            "No note password provided and no TTY available. Use --password or EPHEMERA_NOTE_PASSWORD.",
        )
        .into());
    }
    let mut prompt = Password::new().with_prompt("Note password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm note password", "Passwords do not match");
    }
    prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Parse a note ID.
pub fn parse_note_id(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| CliError::invalid_input(format!("Invalid note ID: {}", value)).into())
}

/// Read note content from --content flag, stdin, or $EDITOR.
pub fn read_note_content(content: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = content {
        if value.trim().is_empty() {
            return Err(CliError::invalid_input("--content cannot be empty").into());
        }
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        return non_blank(buffer, "No input provided on stdin");
    }

    read_content_from_editor()
}

/// Open $EDITOR to compose note content.
fn read_content_from_editor() -> anyhow::Result<String> {
    let editor = std::env::var("EDITOR").map_err(|_| {
        CliError::invalid_input("$EDITOR is not set; use --content or pipe content via stdin")
    })?;

    let file = tempfile::Builder::new()
        .prefix("ephemera_note_")
        .suffix(".md")
        .tempfile()
        .map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;

    let status = Command::new(editor)
        .arg(file.path())
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e))?;
    if !status.success() {
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let contents = std::fs::read_to_string(file.path())
        .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e))?;

    non_blank(contents, "Note content is empty")
}

/// Content is stored exactly as supplied; only all-whitespace input is rejected.
fn non_blank(content: String, message: &str) -> anyhow::Result<String> {
    if content.trim().is_empty() {
        return Err(CliError::invalid_input(message).into());
    }
    Ok(content)
}
