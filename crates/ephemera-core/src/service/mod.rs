//! Note authoring and access-control engines.
//!
//! [`NoteService`] owns a store, the injected [`NoteCipher`] and a [`Clock`].
//! Authoring (`create`) lives in `authoring.rs`; the per-request access state
//! machine (`status`, `view`, `unlock`, `edit`, `remove`, `list`) lives in
//! `access.rs`.

mod access;
mod authoring;
mod types;

use std::sync::Arc;

use crate::crypto::NoteCipher;
use crate::expiry::{Clock, SystemClock};
use crate::storage::NoteStore;

pub use authoring::{MAX_CONTENT_BYTES, MAX_TITLE_CHARS};
pub use types::{Caller, DisclosedNote, NewNote, NoteEdit, NoteStatus, NoteSummary};

/// The note lifecycle engine.
pub struct NoteService<S: NoteStore, C: Clock = SystemClock> {
    store: S,
    cipher: Arc<NoteCipher>,
    clock: C,
}

impl<S: NoteStore> NoteService<S, SystemClock> {
    /// Create a service that reads wall-clock time.
    pub fn new(store: S, cipher: Arc<NoteCipher>) -> Self {
        Self::with_clock(store, cipher, SystemClock)
    }
}

impl<S: NoteStore, C: Clock> NoteService<S, C> {
    pub fn with_clock(store: S, cipher: Arc<NoteCipher>, clock: C) -> Self {
        Self {
            store,
            cipher,
            clock,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
