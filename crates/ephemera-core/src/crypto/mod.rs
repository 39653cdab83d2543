//! Cryptographic operations for Ephemera.
//!
//! This module provides encryption and password hashing services using
//! well-audited libraries:
//! - **XChaCha20-Poly1305**: Authenticated encryption of note bodies and note passwords
//! - **Argon2id**: Memory-hard hashing of account passwords
//!
//! ## Security Model
//!
//! - A single 32-byte server key, loaded once at startup and injected as a
//!   [`NoteCipher`] into the engines
//! - A fresh random nonce for every encryption, stored next to the ciphertext
//! - Plaintext note bodies and note passwords are never persisted
//! - Key material zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the database file without the server key
//! - Tampering with stored ciphertext (detected by the AEAD tag)
//!
//! We do NOT defend against:
//! - A compromised server process or host
//! - Anyone holding a note's link for unprotected notes

pub mod cipher;
pub mod key;
pub mod password;

pub use cipher::NoteCipher;
pub use key::{ServerKey, KEY_LENGTH};
pub use password::{hash_password, validate_password, verify_password};
