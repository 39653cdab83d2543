//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const FAILURE: i32 = 1;

    /// Resource not found (config, database, note).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong note password or account credentials).
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;

    /// The note existed but has expired.
    pub const GONE: i32 = 7;

    /// Wrong access method for the note.
    pub const FORBIDDEN: i32 = 8;
}

/// Environment variable holding the base64 server key.
pub const ENV_KEY: &str = "EPHEMERA_KEY";

/// Environment variable overriding the config file path.
pub const ENV_CONFIG: &str = "EPHEMERA_CONFIG";

/// Environment variable holding the `--user` account password.
pub const ENV_PASSWORD: &str = "EPHEMERA_PASSWORD";

/// Environment variable holding the new password for `account password`.
pub const ENV_NEW_PASSWORD: &str = "EPHEMERA_NEW_PASSWORD";

/// Environment variable holding the tracing filter.
pub const ENV_LOG: &str = "EPHEMERA_LOG";
