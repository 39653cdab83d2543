//! Note authoring: validation and encryption on create.

use tracing::info;

use super::types::{Caller, NewNote, NoteSummary};
use super::NoteService;
use crate::error::{NoteError, Result};
use crate::expiry::{Clock, ExpirationPolicy, ExpirationType, ExpiryWindow};
use crate::storage::{NewNoteRecord, NoteStore};

/// Maximum size of a note body in bytes.
pub const MAX_CONTENT_BYTES: usize = 1024 * 1024;

/// Maximum length of a note title in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Trim a title; blank titles are stored as `None`.
pub(super) fn normalize_title(title: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = title else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(NoteError::Validation(format!(
            "Title too long (max {} characters)",
            MAX_TITLE_CHARS
        )));
    }
    Ok(Some(trimmed.to_string()))
}

pub(super) fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(NoteError::InvalidInput(
            "Note content cannot be empty".to_string(),
        ));
    }
    if content.len() > MAX_CONTENT_BYTES {
        return Err(NoteError::Validation(format!(
            "Note content too large (max {} bytes)",
            MAX_CONTENT_BYTES
        )));
    }
    Ok(())
}

/// Decide the policy for a new note.
///
/// Time-based notes must name one of the fixed windows. Any expiration
/// supplied with `never` or `view` is discarded.
fn resolve_policy(draft: &NewNote) -> Result<ExpirationPolicy> {
    match draft.expiration_type {
        ExpirationType::Time => {
            let raw = draft.expiration.as_deref().ok_or_else(|| {
                NoteError::InvalidExpiration(
                    "Time-based notes require an expiration".to_string(),
                )
            })?;
            let window = raw
                .parse::<ExpiryWindow>()
                .map_err(|e| NoteError::InvalidExpiration(e.to_string()))?;
            Ok(ExpirationPolicy::Time(window))
        }
        ExpirationType::Never => Ok(ExpirationPolicy::Never),
        ExpirationType::View => Ok(ExpirationPolicy::View),
    }
}

impl<S: NoteStore, C: Clock> NoteService<S, C> {
    /// Validate, encrypt and persist a new note.
    ///
    /// The note is protected iff a non-empty password is supplied. Notes
    /// created by an account are owned by it; all others are guest notes.
    ///
    /// # Errors
    ///
    /// - `NoteError::InvalidExpiration` for a missing or unknown time window
    /// - `NoteError::InvalidInput` for blank content
    /// - `NoteError::Validation` for oversized content or title
    pub fn create(&self, draft: &NewNote, caller: &Caller) -> Result<NoteSummary> {
        let policy = resolve_policy(draft)?;
        validate_content(&draft.content)?;
        let title = normalize_title(draft.title.as_deref())?;

        let content = self.cipher.encrypt(&draft.content)?;
        let password = match draft.password.as_deref() {
            Some(password) if !password.is_empty() => Some(self.cipher.encrypt(password)?),
            _ => None,
        };

        let now = self.clock.now();
        let mut record = NewNoteRecord::new(content, policy, now)
            .with_title(title)
            .with_password(password);
        if let Caller::Account(user_id) = caller {
            record = record.with_owner(*user_id);
        }

        let note = self.store.create_note(&record)?;
        info!(
            note_id = %note.id,
            expiration_type = %note.expiration_type,
            password_protected = note.password_protected,
            guest = note.is_guest,
            "created note"
        );

        Ok(NoteSummary::from_note(&note, policy.expires_at(note.created)))
    }
}
