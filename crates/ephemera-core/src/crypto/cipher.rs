//! Authenticated encryption of note bodies and note passwords.
//!
//! Stored values are self-contained: `hex(nonce):hex(ciphertext || tag)`.
//! Decryption needs only that string and the server key.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;

use super::key::ServerKey;
use crate::error::{NoteError, Result};

/// Size of the nonce in bytes (192 bits for XChaCha20).
pub const NONCE_SIZE: usize = 24;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

const SEPARATOR: char = ':';

/// Encryption service for note data, bound to one server key.
///
/// Constructed once at startup and shared by the authoring and
/// access-control engines.
pub struct NoteCipher {
    cipher: XChaCha20Poly1305,
}

impl NoteCipher {
    /// Create a cipher bound to `key`.
    pub fn new(key: &ServerKey) -> Self {
        Self {
            cipher: XChaCha20Poly1305::new(key.as_bytes().into()),
        }
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    ///
    /// Two encryptions of the same plaintext never produce the same output.
    ///
    /// # Examples
    ///
    /// ```
    /// use ephemera_core::crypto::{NoteCipher, ServerKey};
    ///
    /// let cipher = NoteCipher::new(&ServerKey::generate());
    /// let sealed = cipher.encrypt("secret").unwrap();
    /// assert_eq!(cipher.decrypt(&sealed).unwrap(), "secret");
    /// ```
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| NoteError::Crypto("XChaCha20-Poly1305 encryption failed".to_string()))?;

        Ok(format!(
            "{}{}{}",
            hex::encode(nonce),
            SEPARATOR,
            hex::encode(ciphertext)
        ))
    }

    /// Decrypt a value produced by [`NoteCipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `NoteError::Decryption` if:
    /// - The stored value is malformed
    /// - The value was sealed under a different key
    /// - The ciphertext has been tampered with
    pub fn decrypt(&self, stored: &str) -> Result<String> {
        let (nonce_hex, ciphertext_hex) = stored.split_once(SEPARATOR).ok_or_else(|| {
            tracing::debug!("ciphertext is missing the nonce separator");
            NoteError::Decryption
        })?;

        let nonce = hex::decode(nonce_hex).map_err(|_| NoteError::Decryption)?;
        if nonce.len() != NONCE_SIZE {
            tracing::debug!(len = nonce.len(), "nonce has the wrong length");
            return Err(NoteError::Decryption);
        }

        let ciphertext = hex::decode(ciphertext_hex).map_err(|_| NoteError::Decryption)?;
        if ciphertext.len() < TAG_SIZE {
            tracing::debug!(len = ciphertext.len(), "ciphertext shorter than tag");
            return Err(NoteError::Decryption);
        }

        let plaintext = self
            .cipher
            .decrypt(XNonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|_| NoteError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| NoteError::Decryption)
    }
}

impl std::fmt::Debug for NoteCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NoteCipher([REDACTED])")
    }
}
