//! Storage layer for Ephemera.
//!
//! This module defines the repository contracts the engines depend on and
//! the SQLite implementation that backs them.
//!
//! ## Concurrency
//!
//! The engines do not coordinate among themselves. The only serialization
//! point they rely on is [`NoteStore::delete_note`] reporting whether this
//! call removed the row, which is what bounds a view-once note to a single
//! disclosure.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStore;
pub use traits::{AccountStore, NoteStore};
pub use types::{Account, NewAccount, NewNoteRecord, Note, NoteScope, NoteUpdate};
