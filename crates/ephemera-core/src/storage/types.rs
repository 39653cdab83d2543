//! Core data types for the storage layer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::expiry::{ExpirationPolicy, ExpirationType};

/// A persisted note.
///
/// `content` and `password` hold ciphertext produced by
/// [`NoteCipher`](crate::crypto::NoteCipher); plaintext is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Opaque identifier; possession of it grants access to unprotected notes
    pub id: Uuid,

    /// Optional display title
    pub title: Option<String>,

    /// Encrypted note body
    pub content: String,

    /// Declared expiration kind
    pub expiration_type: ExpirationType,

    /// Expiration window label, only meaningful for time-based notes
    pub expiration: Option<String>,

    /// Whether a password gates disclosure
    pub password_protected: bool,

    /// Encrypted note password, present iff `password_protected`
    pub password: Option<String>,

    /// Anchor for time-based expiry
    pub created: DateTime<Utc>,

    /// Last content edit
    pub updated: DateTime<Utc>,

    /// Owning account, `None` for guest notes
    pub user_id: Option<Uuid>,

    /// Created without an authenticated owner
    pub is_guest: bool,
}

impl Note {
    /// Parse the note's persisted expiration fields into a policy.
    pub fn policy(&self) -> Result<ExpirationPolicy> {
        ExpirationPolicy::from_parts(self.expiration_type, self.expiration.as_deref())
    }
}

/// Fields for inserting a new note. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewNoteRecord {
    pub title: Option<String>,
    pub content: String,
    pub expiration_type: ExpirationType,
    pub expiration: Option<String>,
    pub password: Option<String>,
    pub user_id: Option<Uuid>,
    pub is_guest: bool,
    pub created: DateTime<Utc>,
}

impl NewNoteRecord {
    pub fn new(content: impl Into<String>, policy: ExpirationPolicy, created: DateTime<Utc>) -> Self {
        Self {
            title: None,
            content: content.into(),
            expiration_type: policy.expiration_type(),
            expiration: policy.expiration_label().map(str::to_string),
            password: None,
            user_id: None,
            is_guest: true,
            created,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_password(mut self, encrypted_password: Option<String>) -> Self {
        self.password = encrypted_password;
        self
    }

    pub fn with_owner(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self.is_guest = false;
        self
    }

    pub fn password_protected(&self) -> bool {
        self.password.is_some()
    }
}

/// The only fields an edit may change.
#[derive(Debug, Clone)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: String,
    pub updated: DateTime<Utc>,
}

/// Which notes a listing covers.
///
/// Owner and guest listings are never cross-visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope {
    /// Notes owned by one account
    Owner(Uuid),
    /// Notes created without an account
    Guests,
    /// Every note (maintenance only)
    All,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// Argon2id PHC string
    pub password_hash: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Fields for inserting a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created: DateTime<Utc>,
}
