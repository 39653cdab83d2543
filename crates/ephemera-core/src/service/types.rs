//! Request and response shapes of the note engines.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::expiry::ExpirationType;
use crate::storage::Note;

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Anonymous visitor
    Guest,
    /// Authenticated account holder
    Account(Uuid),
}

/// Input for creating a note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: Option<String>,
    pub content: String,
    pub expiration_type: ExpirationType,
    /// Required when `expiration_type` is `time`
    pub expiration: Option<String>,
    /// Plaintext note password; empty means unprotected
    pub password: Option<String>,
}

impl NewNote {
    pub fn new(content: impl Into<String>, expiration_type: ExpirationType) -> Self {
        Self {
            title: None,
            content: content.into(),
            expiration_type,
            expiration: None,
            password: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_expiration(mut self, expiration: impl Into<String>) -> Self {
        self.expiration = Some(expiration.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Input for editing a note. Security settings are not editable.
#[derive(Debug, Clone)]
pub struct NoteEdit {
    /// New title; `None` keeps the current one
    pub title: Option<String>,
    pub content: String,
}

/// Metadata about a note. Never carries content, encrypted or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub expiration_type: ExpirationType,
    pub expiration: Option<String>,
    pub password_protected: bool,
    /// Computed deadline for time-based notes
    pub expires_at: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub is_guest: bool,
}

impl NoteSummary {
    pub(crate) fn from_note(note: &Note, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            expiration_type: note.expiration_type,
            expiration: note.expiration.clone(),
            password_protected: note.password_protected,
            expires_at,
            created: note.created,
            updated: note.updated,
            user_id: note.user_id,
            is_guest: note.is_guest,
        }
    }
}

/// Result of a status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStatus {
    pub title: Option<String>,
    pub is_password_protected: bool,
}

/// A successful disclosure of decrypted content.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosedNote {
    pub title: Option<String>,
    pub content: String,
    pub is_password_protected: bool,
}

impl std::fmt::Debug for DisclosedNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisclosedNote")
            .field("title", &self.title)
            .field("content", &"[REDACTED]")
            .field("is_password_protected", &self.is_password_protected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_builder() {
        let note = NewNote::new("body", ExpirationType::Time)
            .with_title("t")
            .with_expiration("1 hour")
            .with_password("pw");
        assert_eq!(note.title.as_deref(), Some("t"));
        assert_eq!(note.expiration.as_deref(), Some("1 hour"));
        assert_eq!(note.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = NoteStatus {
            title: Some("t".to_string()),
            is_password_protected: true,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["isPasswordProtected"], serde_json::json!(true));
    }

    #[test]
    fn test_disclosed_debug_redacts_content() {
        let disclosed = DisclosedNote {
            title: None,
            content: "top secret".to_string(),
            is_password_protected: false,
        };
        assert!(!format!("{:?}", disclosed).contains("top secret"));
    }
}
