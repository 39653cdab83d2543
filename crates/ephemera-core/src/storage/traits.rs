//! Repository trait definitions.
//!
//! The engines only talk to storage through these traits, so a different
//! backend can be swapped in without touching the access-control logic.

use std::sync::Arc;

use uuid::Uuid;

use super::types::{Account, NewAccount, NewNoteRecord, Note, NoteScope, NoteUpdate};
use crate::error::Result;

/// Note repository.
///
/// All implementations must ensure:
/// - Each operation is atomic for a single note row
/// - A row removed by `delete_note` is never observed again by any reader
/// - Exactly one of any number of concurrent `delete_note` calls for the
///   same id reports `true`
pub trait NoteStore: Send + Sync {
    /// Insert a new note and return it with its assigned id.
    fn create_note(&self, record: &NewNoteRecord) -> Result<Note>;

    /// Get a note by id.
    ///
    /// Returns `Ok(Some(note))` if found, `Ok(None)` if not found.
    fn get_note(&self, id: &Uuid) -> Result<Option<Note>>;

    /// Update a note's title and content.
    ///
    /// Expiration and password columns are never written by this method.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::NotFound` if the note no longer exists.
    fn update_note(&self, id: &Uuid, update: &NoteUpdate) -> Result<Note>;

    /// Physically delete a note.
    ///
    /// Returns `true` iff this call removed the row.
    fn delete_note(&self, id: &Uuid) -> Result<bool>;

    /// List notes in a scope, newest first.
    fn list_notes(&self, scope: &NoteScope) -> Result<Vec<Note>>;

    /// Check store integrity.
    ///
    /// Verifies:
    /// - Backend consistency checks
    /// - Every note row decodes and carries a parseable expiration
    /// - Password columns agree with the protection flag
    fn check_integrity(&self) -> Result<()>;
}

/// Account repository.
pub trait AccountStore: Send + Sync {
    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::AccountExists` if the email is taken.
    fn create_account(&self, account: &NewAccount) -> Result<Account>;

    fn get_account(&self, id: &Uuid) -> Result<Option<Account>>;

    /// Look up an account by its normalized email.
    fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    fn update_account_password(&self, id: &Uuid, password_hash: &str) -> Result<Account>;

    fn update_account_name(&self, id: &Uuid, name: Option<&str>) -> Result<Account>;

    /// Number of notes currently owned by the account.
    fn count_notes_for_account(&self, id: &Uuid) -> Result<usize>;
}

impl<T: NoteStore + ?Sized> NoteStore for Arc<T> {
    fn create_note(&self, record: &NewNoteRecord) -> Result<Note> {
        (**self).create_note(record)
    }

    fn get_note(&self, id: &Uuid) -> Result<Option<Note>> {
        (**self).get_note(id)
    }

    fn update_note(&self, id: &Uuid, update: &NoteUpdate) -> Result<Note> {
        (**self).update_note(id, update)
    }

    fn delete_note(&self, id: &Uuid) -> Result<bool> {
        (**self).delete_note(id)
    }

    fn list_notes(&self, scope: &NoteScope) -> Result<Vec<Note>> {
        (**self).list_notes(scope)
    }

    fn check_integrity(&self) -> Result<()> {
        (**self).check_integrity()
    }
}

impl<T: AccountStore + ?Sized> AccountStore for Arc<T> {
    fn create_account(&self, account: &NewAccount) -> Result<Account> {
        (**self).create_account(account)
    }

    fn get_account(&self, id: &Uuid) -> Result<Option<Account>> {
        (**self).get_account(id)
    }

    fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        (**self).get_account_by_email(email)
    }

    fn update_account_password(&self, id: &Uuid, password_hash: &str) -> Result<Account> {
        (**self).update_account_password(id, password_hash)
    }

    fn update_account_name(&self, id: &Uuid, name: Option<&str>) -> Result<Account> {
        (**self).update_account_name(id, name)
    }

    fn count_notes_for_account(&self, id: &Uuid) -> Result<usize> {
        (**self).count_notes_for_account(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_definitions_compile() {
        fn _accepts_note_store<T: NoteStore>(_store: T) {}
        fn _accepts_account_store<T: AccountStore>(_store: T) {}
        fn _accepts_dyn_note_store(_store: &dyn NoteStore) {}
        fn _accepts_shared<T: NoteStore + AccountStore>(store: Arc<T>) {
            _accepts_note_store(Arc::clone(&store));
            _accepts_account_store(store);
        }
    }
}
