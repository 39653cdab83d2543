//! Access control: the per-request state machine over a note.
//!
//! Every request walks the same steps: fetch, expiry check (deleting the note
//! and answering `Gone` if its deadline has passed), the password gate for
//! protected notes, decryption, and finally the self-destruct of view-once
//! notes. Nothing about a request is persisted except the deletions.
//!
//! A view-once note is disclosed only to the caller whose delete actually
//! removed the row. Concurrent callers that fetched the same note lose the
//! race at the store and get `NotFound`.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::authoring::{normalize_title, validate_content};
use super::types::{Caller, DisclosedNote, NoteEdit, NoteStatus, NoteSummary};
use super::NoteService;
use crate::error::{NoteError, Result};
use crate::expiry::{Clock, ExpirationPolicy};
use crate::storage::{Note, NoteScope, NoteStore, NoteUpdate};

impl<S: NoteStore, C: Clock> NoteService<S, C> {
    fn fetch(&self, id: &Uuid) -> Result<Note> {
        self.store.get_note(id)?.ok_or(NoteError::NotFound)
    }

    /// Parse the note's policy and enforce time-based expiry.
    ///
    /// An expired note is deleted before `Gone` is returned.
    fn ensure_alive(&self, note: &Note) -> Result<ExpirationPolicy> {
        let policy = note.policy().map_err(|e| {
            warn!(note_id = %note.id, error = %e, "note has malformed expiration data");
            NoteError::InvalidState(e.to_string())
        })?;

        if policy.is_expired(note.created, self.clock.now()) {
            self.store.delete_note(&note.id)?;
            info!(note_id = %note.id, "deleted expired note");
            return Err(NoteError::Gone);
        }

        Ok(policy)
    }

    fn decrypt_field(&self, note_id: &Uuid, stored: &str) -> Result<String> {
        self.cipher.decrypt(stored).map_err(|e| {
            error!(note_id = %note_id, "failed to decrypt stored note data");
            e
        })
    }

    /// Hand out decrypted content, destroying view-once notes first.
    fn disclose(
        &self,
        note: &Note,
        policy: ExpirationPolicy,
        content: String,
    ) -> Result<DisclosedNote> {
        if policy.is_view_once() {
            if !self.store.delete_note(&note.id)? {
                debug!(note_id = %note.id, "view-once note already consumed by another request");
                return Err(NoteError::NotFound);
            }
            info!(note_id = %note.id, "view-once note self-destructed");
        }

        Ok(DisclosedNote {
            title: note.title.clone(),
            content,
            is_password_protected: note.password_protected,
        })
    }

    fn summarize(note: &Note, policy: ExpirationPolicy) -> NoteSummary {
        NoteSummary::from_note(note, policy.expires_at(note.created))
    }

    /// Report a note's title and protection without viewing it.
    ///
    /// Never decrypts content and never consumes a view-once note.
    pub fn status(&self, id: &Uuid) -> Result<NoteStatus> {
        let note = self.fetch(id)?;
        self.ensure_alive(&note)?;
        debug!(note_id = %id, "status checked");

        Ok(NoteStatus {
            title: note.title,
            is_password_protected: note.password_protected,
        })
    }

    /// Disclose an unprotected note.
    ///
    /// # Errors
    ///
    /// - `NoteError::NotFound` if the note does not exist
    /// - `NoteError::Gone` if it has expired (it is deleted)
    /// - `NoteError::Forbidden` if it is password protected
    /// - `NoteError::Decryption` if its content cannot be decrypted
    pub fn view(&self, id: &Uuid) -> Result<DisclosedNote> {
        let note = self.fetch(id)?;
        let policy = self.ensure_alive(&note)?;

        if note.password_protected {
            return Err(NoteError::Forbidden(
                "Note is password protected; unlock it with its password".to_string(),
            ));
        }

        let content = self.decrypt_field(&note.id, &note.content)?;
        self.disclose(&note, policy, content)
    }

    /// Disclose a password-protected note.
    ///
    /// A wrong password leaves the note untouched and may be retried. The
    /// first correct password consumes a view-once note.
    ///
    /// # Errors
    ///
    /// - `NoteError::NotFound` if the note does not exist
    /// - `NoteError::Gone` if it has expired (it is deleted)
    /// - `NoteError::Forbidden` if it has no password
    /// - `NoteError::InvalidInput` if `password` is empty
    /// - `NoteError::Unauthorized` if `password` does not match
    pub fn unlock(&self, id: &Uuid, password: &str) -> Result<DisclosedNote> {
        let note = self.fetch(id)?;
        let policy = self.ensure_alive(&note)?;

        let Some(stored_password) = note.password.as_deref() else {
            return Err(NoteError::Forbidden(
                "Note is not password protected; view it directly".to_string(),
            ));
        };
        if password.is_empty() {
            return Err(NoteError::InvalidInput("Password is required".to_string()));
        }

        let expected = SecretString::from(self.decrypt_field(&note.id, stored_password)?);
        if !passwords_match(&expected, password) {
            warn!(note_id = %note.id, "incorrect note password");
            return Err(NoteError::Unauthorized);
        }

        let content = self.decrypt_field(&note.id, &note.content)?;
        self.disclose(&note, policy, content)
    }

    /// Replace a note's content (and optionally its title).
    ///
    /// Expiration and password settings are carried over unchanged; editing
    /// never extends a deadline.
    ///
    /// # Errors
    ///
    /// - `NoteError::NotFound` if the note does not exist
    /// - `NoteError::Gone` if it has expired (it is deleted)
    pub fn edit(&self, id: &Uuid, edit: &NoteEdit) -> Result<NoteSummary> {
        let note = self.fetch(id)?;
        let policy = self.ensure_alive(&note)?;

        validate_content(&edit.content)?;
        let title = match edit.title.as_deref() {
            Some(title) => normalize_title(Some(title))?,
            None => note.title.clone(),
        };

        let update = NoteUpdate {
            title,
            content: self.cipher.encrypt(&edit.content)?,
            updated: self.clock.now(),
        };
        let updated = self.store.update_note(&note.id, &update)?;
        info!(note_id = %note.id, "edited note");

        Ok(Self::summarize(&updated, policy))
    }

    /// Delete a note unconditionally.
    ///
    /// Returns `false` if there was nothing to delete.
    pub fn remove(&self, id: &Uuid) -> Result<bool> {
        let removed = self.store.delete_note(id)?;
        if removed {
            info!(note_id = %id, "deleted note");
        }
        Ok(removed)
    }

    /// List the caller's notes, newest first.
    ///
    /// Accounts see their own notes; guests see guest notes. Expired notes
    /// found along the way are deleted and left out. Rows with malformed
    /// expiration data are skipped.
    pub fn list(&self, caller: &Caller) -> Result<Vec<NoteSummary>> {
        let scope = match caller {
            Caller::Account(user_id) => NoteScope::Owner(*user_id),
            Caller::Guest => NoteScope::Guests,
        };

        let now = self.clock.now();
        let mut summaries = Vec::new();
        for note in self.store.list_notes(&scope)? {
            if let Some(policy) = self.live_policy(&note, now)? {
                summaries.push(Self::summarize(&note, policy));
            }
        }
        Ok(summaries)
    }

    /// Delete every expired note in the store.
    ///
    /// Expiry is otherwise lazy; this sweep only runs when invoked.
    /// Returns the number of notes deleted.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut purged = 0;
        for note in self.store.list_notes(&NoteScope::All)? {
            let policy = match note.policy() {
                Ok(policy) => policy,
                Err(e) => {
                    warn!(note_id = %note.id, error = %e, "skipping note with malformed expiration");
                    continue;
                }
            };
            if policy.is_expired(note.created, now) && self.store.delete_note(&note.id)? {
                purged += 1;
            }
        }
        info!(purged, "purged expired notes");
        Ok(purged)
    }

    /// `Some(policy)` for a live note; `None` if it expired (and was deleted)
    /// or is malformed.
    fn live_policy(&self, note: &Note, now: DateTime<Utc>) -> Result<Option<ExpirationPolicy>> {
        let policy = match note.policy() {
            Ok(policy) => policy,
            Err(e) => {
                warn!(note_id = %note.id, error = %e, "skipping note with malformed expiration");
                return Ok(None);
            }
        };
        if policy.is_expired(note.created, now) {
            self.store.delete_note(&note.id)?;
            info!(note_id = %note.id, "deleted expired note");
            return Ok(None);
        }
        Ok(Some(policy))
    }
}

/// Exact, case-sensitive comparison that does not stop at the first
/// differing byte.
fn passwords_match(expected: &SecretString, supplied: &str) -> bool {
    expected
        .expose_secret()
        .as_bytes()
        .ct_eq(supplied.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    use crate::crypto::{NoteCipher, ServerKey};
    use crate::expiry::{ExpirationType, ManualClock};
    use crate::service::NewNote;
    use crate::storage::SqliteStore;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn service() -> NoteService<SqliteStore, Arc<ManualClock>> {
        NoteService::with_clock(
            SqliteStore::open_in_memory().unwrap(),
            Arc::new(NoteCipher::new(&ServerKey::generate())),
            Arc::new(ManualClock::new(start())),
        )
    }

    fn create(service: &NoteService<SqliteStore, Arc<ManualClock>>, draft: NewNote) -> Uuid {
        service.create(&draft, &Caller::Guest).unwrap().id
    }

    #[test]
    fn test_status_never_consumes_view_once() {
        let service = service();
        let id = create(&service, NewNote::new("secret", ExpirationType::View).with_title("t"));

        for _ in 0..3 {
            let status = service.status(&id).unwrap();
            assert_eq!(status.title.as_deref(), Some("t"));
            assert!(!status.is_password_protected);
        }
        assert!(service.store().get_note(&id).unwrap().is_some());
    }

    #[test]
    fn test_view_once_discloses_exactly_once() {
        let service = service();
        let id = create(&service, NewNote::new("secret", ExpirationType::View));

        let disclosed = service.view(&id).unwrap();
        assert_eq!(disclosed.content, "secret");
        assert!(!disclosed.is_password_protected);

        assert!(matches!(service.view(&id), Err(NoteError::NotFound)));
        assert!(matches!(service.status(&id), Err(NoteError::NotFound)));
    }

    #[test]
    fn test_never_note_survives_views() {
        let service = service();
        let id = create(&service, NewNote::new("keep", ExpirationType::Never));
        service.clock.advance(Duration::days(3650));
        for _ in 0..3 {
            assert_eq!(service.view(&id).unwrap().content, "keep");
        }
    }

    #[test]
    fn test_view_rejects_protected_note() {
        let service = service();
        let id = create(
            &service,
            NewNote::new("secret", ExpirationType::View).with_password("pw"),
        );
        assert!(matches!(service.view(&id), Err(NoteError::Forbidden(_))));
        assert!(service.store().get_note(&id).unwrap().is_some());
    }

    #[test]
    fn test_unlock_wrong_password_is_repeatable_and_harmless() {
        let service = service();
        let id = create(
            &service,
            NewNote::new("secret", ExpirationType::View).with_password("Hunter2"),
        );
        let before = service.store().get_note(&id).unwrap().unwrap();

        for attempt in ["hunter2", "Hunter", "Hunter2 ", "wrong"] {
            let err = service.unlock(&id, attempt).unwrap_err();
            assert!(matches!(err, NoteError::Unauthorized));
            assert!(err.is_retryable());
        }
        assert_eq!(service.store().get_note(&id).unwrap().unwrap(), before);

        let disclosed = service.unlock(&id, "Hunter2").unwrap();
        assert_eq!(disclosed.content, "secret");
        assert!(disclosed.is_password_protected);

        assert!(matches!(service.unlock(&id, "Hunter2"), Err(NoteError::NotFound)));
    }

    #[test]
    fn test_passwords_match_is_exact() {
        let expected = SecretString::from("Hunter2".to_string());
        assert!(passwords_match(&expected, "Hunter2"));
        for guess in ["Hunter", "Hunter3", "hunter2", "Hunter2 ", "", "Hunter22"] {
            assert!(!passwords_match(&expected, guess), "{guess:?} matched");
        }
    }

    #[test]
    fn test_unlock_never_note_keeps_it() {
        let service = service();
        let id = create(
            &service,
            NewNote::new("secret", ExpirationType::Never).with_password("pw"),
        );
        assert_eq!(service.unlock(&id, "pw").unwrap().content, "secret");
        assert_eq!(service.unlock(&id, "pw").unwrap().content, "secret");
    }

    #[test]
    fn test_unlock_requires_protection_and_password() {
        let service = service();
        let open = create(&service, NewNote::new("x", ExpirationType::Never));
        assert!(matches!(service.unlock(&open, "pw"), Err(NoteError::Forbidden(_))));

        let locked = create(
            &service,
            NewNote::new("x", ExpirationType::Never).with_password("pw"),
        );
        assert!(matches!(service.unlock(&locked, ""), Err(NoteError::InvalidInput(_))));
    }

    #[test]
    fn test_time_note_expires_strictly_after_deadline() {
        let service = service();
        let id = create(
            &service,
            NewNote::new("x", ExpirationType::Time).with_expiration("5 minutes"),
        );

        service.clock.advance(Duration::minutes(5));
        assert_eq!(service.view(&id).unwrap().content, "x");

        service.clock.advance(Duration::seconds(1));
        assert!(matches!(service.status(&id), Err(NoteError::Gone)));
        assert!(service.store().get_note(&id).unwrap().is_none());
        assert!(matches!(service.view(&id), Err(NoteError::NotFound)));
    }

    #[test]
    fn test_expired_note_is_gone_for_every_access_path() {
        let service = service();
        let draft = NewNote::new("x", ExpirationType::Time).with_expiration("1 hour");
        let ids: Vec<Uuid> = (0..3).map(|_| create(&service, draft.clone())).collect();
        service.clock.advance(Duration::hours(2));

        assert!(matches!(service.view(&ids[0]), Err(NoteError::Gone)));
        assert!(matches!(service.unlock(&ids[1], "pw"), Err(NoteError::Gone)));
        let edit = NoteEdit {
            title: None,
            content: "y".to_string(),
        };
        assert!(matches!(service.edit(&ids[2], &edit), Err(NoteError::Gone)));
        for id in &ids {
            assert!(service.store().get_note(id).unwrap().is_none());
        }
    }

    #[test]
    fn test_edit_preserves_security_settings() {
        let service = service();
        let id = create(
            &service,
            NewNote::new("old", ExpirationType::Time)
                .with_expiration("1 day")
                .with_password("pw")
                .with_title("title"),
        );
        let before = service.store().get_note(&id).unwrap().unwrap();

        service.clock.advance(Duration::hours(1));
        let summary = service
            .edit(
                &id,
                &NoteEdit {
                    title: Some("renamed".to_string()),
                    content: "new".to_string(),
                },
            )
            .unwrap();

        let after = service.store().get_note(&id).unwrap().unwrap();
        assert_eq!(after.expiration_type, before.expiration_type);
        assert_eq!(after.expiration, before.expiration);
        assert_eq!(after.password_protected, before.password_protected);
        assert_eq!(after.password, before.password);
        assert_eq!(after.created, before.created);
        assert_eq!(after.title.as_deref(), Some("renamed"));
        assert_eq!(summary.expires_at, Some(before.created + Duration::days(1)));
        assert_eq!(service.unlock(&id, "pw").unwrap().content, "new");
    }

    #[test]
    fn test_edit_without_title_keeps_title() {
        let service = service();
        let id = create(&service, NewNote::new("old", ExpirationType::Never).with_title("keep"));
        let summary = service
            .edit(
                &id,
                &NoteEdit {
                    title: None,
                    content: "new".to_string(),
                },
            )
            .unwrap();
        assert_eq!(summary.title.as_deref(), Some("keep"));
    }

    #[test]
    fn test_missing_note_is_not_found_everywhere() {
        let service = service();
        let id = Uuid::new_v4();
        assert!(matches!(service.status(&id), Err(NoteError::NotFound)));
        assert!(matches!(service.view(&id), Err(NoteError::NotFound)));
        assert!(matches!(service.unlock(&id, "pw"), Err(NoteError::NotFound)));
        let edit = NoteEdit {
            title: None,
            content: "y".to_string(),
        };
        assert!(matches!(service.edit(&id, &edit), Err(NoteError::NotFound)));
        assert!(!service.remove(&id).unwrap());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let service = service();
        let id = create(&service, NewNote::new("x", ExpirationType::Never));
        assert!(service.remove(&id).unwrap());
        assert!(!service.remove(&id).unwrap());
    }

    #[test]
    fn test_corrupted_content_is_opaque_decryption_error() {
        let service = service();
        let id = create(&service, NewNote::new("x", ExpirationType::View));

        let other = NoteService::with_clock(
            SqliteStore::open_in_memory().unwrap(),
            Arc::new(NoteCipher::new(&ServerKey::generate())),
            Arc::clone(&service.clock),
        );
        let note = service.store().get_note(&id).unwrap().unwrap();
        assert!(matches!(
            other.decrypt_field(&note.id, &note.content),
            Err(NoteError::Decryption)
        ));
    }

    #[test]
    fn test_list_skips_and_deletes_expired() {
        let service = service();
        let short = create(
            &service,
            NewNote::new("x", ExpirationType::Time).with_expiration("5 minutes"),
        );
        let long = create(
            &service,
            NewNote::new("x", ExpirationType::Time).with_expiration("1 day"),
        );
        service.clock.advance(Duration::minutes(10));

        let listed: Vec<Uuid> = service
            .list(&Caller::Guest)
            .unwrap()
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(listed, vec![long]);
        assert!(service.store().get_note(&short).unwrap().is_none());
    }

    #[test]
    fn test_purge_expired_counts_deletions() {
        let service = service();
        for _ in 0..2 {
            create(
                &service,
                NewNote::new("x", ExpirationType::Time).with_expiration("1 hour"),
            );
        }
        let survivor = create(&service, NewNote::new("x", ExpirationType::Never));

        assert_eq!(service.purge_expired().unwrap(), 0);
        service.clock.advance(Duration::hours(2));
        assert_eq!(service.purge_expired().unwrap(), 2);
        assert!(service.store().get_note(&survivor).unwrap().is_some());
    }
}
