//! # Ephemera Core
//!
//! Core library for Ephemera - encrypted, self-destructing notes shared by link.
//!
//! This crate provides the note lifecycle and access-control engine
//! independent of any transport or user interface.
//!
//! ## Architecture
//!
//! - **crypto**: Server-key encryption of note bodies and note passwords
//! - **expiry**: Expiration policies and the expiration evaluator
//! - **storage**: Repository traits and the SQLite implementation
//! - **service**: Authoring and access-control engines
//! - **accounts**: Account registration and authentication
//!
//! ## Lifecycle
//!
//! A note is created by the authoring engine, read zero or more times through
//! the access-control engine (exactly once for view-once notes), and deleted
//! explicitly, on expiry detection, or by the self-destruct rule.

pub mod accounts;
pub mod crypto;
pub mod error;
pub mod expiry;
pub mod service;
pub mod storage;

pub use accounts::AccountService;
pub use crypto::{NoteCipher, ServerKey};
pub use error::{NoteError, Result};
pub use expiry::{Clock, ExpirationPolicy, ExpirationType, ExpiryWindow, SystemClock};
pub use service::{Caller, NoteService};
pub use storage::{AccountStore, NoteStore, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
