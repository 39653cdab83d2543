//! Account password validation and hashing.
//!
//! Account passwords are hashed with Argon2id into PHC strings. Note
//! passwords are different: they are encrypted with the server key so the
//! access-control engine can compare them exactly.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{NoteError, Result};

/// Minimum account password length in characters.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate an account password meets minimum security requirements.
///
/// # Requirements
///
/// - At least 8 characters long
/// - Not empty or only whitespace
///
/// # Examples
///
/// ```
/// use ephemera_core::crypto::validate_password;
///
/// assert!(validate_password("my-secure-password-123").is_ok());
/// assert!(validate_password("short").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(NoteError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(NoteError::Validation(format!(
            "Password must be at least {} characters (got {})",
            MIN_PASSWORD_LENGTH, length
        )));
    }

    Ok(())
}

/// Hash an account password with Argon2id and a random salt.
///
/// Returns a PHC string that embeds the algorithm, parameters and salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| NoteError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify an account password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch. A stored hash that cannot be parsed is
/// an `InvalidState` error rather than a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| NoteError::InvalidState(format!("Invalid password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(NoteError::Crypto(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}
