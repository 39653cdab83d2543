//! Error types for Ephemera core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-facing messages and exit codes.

use thiserror::Error;

/// Result type alias for Ephemera operations.
pub type Result<T> = std::result::Result<T, NoteError>;

/// Core error type for Ephemera operations.
#[derive(Debug, Error)]
pub enum NoteError {
    /// No note with the requested id
    #[error("Note not found")]
    NotFound,

    /// The note existed but has expired; it was deleted when this was detected
    #[error("Note has expired")]
    Gone,

    /// Wrong password for a protected note
    #[error("Incorrect password")]
    Unauthorized,

    /// Wrong access method for the note's protection
    #[error("Access method not allowed: {0}")]
    Forbidden(String),

    /// Bad expiration supplied while authoring a note
    #[error("Invalid expiration: {0}")]
    InvalidExpiration(String),

    /// Persisted expiration data could not be parsed
    #[error("Invalid expiration format: {0}")]
    InvalidExpirationFormat(String),

    /// Stored ciphertext is malformed, tampered, or sealed under another key
    #[error("Failed to decrypt note")]
    Decryption,

    /// Persisted data violates an engine invariant
    #[error("Invalid note state: {0}")]
    InvalidState(String),

    /// Key or cipher configuration error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Account email already registered
    #[error("An account with this email already exists")]
    AccountExists,

    /// Email or account password did not match
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl NoteError {
    /// Whether the caller may retry the same operation with different input.
    ///
    /// Only a wrong password is retryable; every other failure is final for
    /// the request that produced it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NoteError::Unauthorized)
    }
}
