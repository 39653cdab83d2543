//! The server-side encryption key.
//!
//! The key is process-wide configuration: it is loaded once at startup and
//! never changes for the lifetime of a [`NoteCipher`](super::NoteCipher).
//! A missing or malformed key is a fatal configuration error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{NoteError, Result};

/// Length of the server key in bytes (256 bits).
pub const KEY_LENGTH: usize = 32;

/// A 256-bit server key for note encryption.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ServerKey {
    bytes: [u8; KEY_LENGTH],
}

impl ServerKey {
    /// Generate a new random key from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::Crypto` if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LENGTH {
            return Err(NoteError::Crypto(format!(
                "Server key must be exactly {} bytes (got {})",
                KEY_LENGTH,
                bytes.len()
            )));
        }
        let mut arr = [0u8; KEY_LENGTH];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Parse a key from its standard base64 encoding.
    ///
    /// Surrounding whitespace is ignored so key files may end with a newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use ephemera_core::crypto::ServerKey;
    ///
    /// let key = ServerKey::generate();
    /// let parsed = ServerKey::from_base64(&key.to_base64()).unwrap();
    /// assert_eq!(key.as_bytes(), parsed.as_bytes());
    /// ```
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            return Err(NoteError::Crypto("Server key is empty".to_string()));
        }
        let mut decoded = STANDARD
            .decode(trimmed)
            .map_err(|e| NoteError::Crypto(format!("Server key is not valid base64: {}", e)))?;
        let key = Self::from_bytes(&decoded);
        decoded.zeroize();
        key
    }

    /// Encode the key as standard base64 for storage in a key file.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }
}

impl std::fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
