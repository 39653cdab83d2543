//! User-facing errors with exit codes.

use std::fmt;

use ephemera_core::NoteError;

use crate::constants::exit_codes;

/// An error to print before exiting with a specific code.
#[derive(Debug)]
pub struct CliError {
    message: String,
    hint: Option<String>,
    code: i32,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            hint,
            code,
        }
    }

    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::new(message, Some(hint.into()), exit_codes::NOT_FOUND)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(message, None, exit_codes::INVALID_INPUT)
    }

    pub fn integrity_failed(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::new(message, Some(hint.into()), exit_codes::INTEGRITY_FAILED)
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    /// Classify an error bubbled up from a command handler.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            return Self::new(cli_err.message.clone(), cli_err.hint.clone(), cli_err.code);
        }
        match err.downcast_ref::<NoteError>() {
            Some(note_err) => Self::from_note_error(note_err),
            None => Self::new(format!("{:#}", err), None, exit_codes::FAILURE),
        }
    }

    fn from_note_error(err: &NoteError) -> Self {
        let message = err.to_string();
        match err {
            NoteError::NotFound => Self::new(
                message,
                Some("The note may have been viewed already or deleted.".to_string()),
                exit_codes::NOT_FOUND,
            ),
            NoteError::Gone => Self::new(
                message,
                Some("Expired notes are deleted when they are accessed.".to_string()),
                exit_codes::GONE,
            ),
            NoteError::Unauthorized => Self::new(
                message,
                Some("Passwords are case-sensitive. You can try again.".to_string()),
                exit_codes::AUTH_FAILED,
            ),
            NoteError::InvalidCredentials => Self::new(message, None, exit_codes::AUTH_FAILED),
            NoteError::Forbidden(_) => Self::new(message, None, exit_codes::FORBIDDEN),
            NoteError::InvalidExpiration(_)
            | NoteError::InvalidExpirationFormat(_)
            | NoteError::Validation(_)
            | NoteError::InvalidInput(_)
            | NoteError::AccountExists => Self::new(message, None, exit_codes::INVALID_INPUT),
            NoteError::Crypto(_) => Self::new(
                message,
                Some("Set EPHEMERA_KEY or run `ephemera init` to create a key file.".to_string()),
                exit_codes::FAILURE,
            ),
            _ => Self::new(message, None, exit_codes::FAILURE),
        }
    }

    /// Print the error (and hint, if any) to stderr and exit.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self.message);
        if let Some(hint) = &self.hint {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(self.code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}
