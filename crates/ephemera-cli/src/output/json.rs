//! JSON output.
//!
//! Core response types serialize with camelCase keys, so they are printed as-is.

use serde::Serialize;

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ephemera_core::service::{NoteStatus, NoteSummary};
    use ephemera_core::ExpirationType;
    use uuid::Uuid;

    #[test]
    fn test_status_uses_camel_case() {
        let status = NoteStatus {
            title: Some("t".into()),
            is_password_protected: true,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["isPasswordProtected"], true);
        assert_eq!(value["title"], "t");
    }

    #[test]
    fn test_summary_never_carries_content() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let summary = NoteSummary {
            id: Uuid::new_v4(),
            title: None,
            expiration_type: ExpirationType::Time,
            expiration: Some("1 hour".into()),
            password_protected: false,
            expires_at: Some(created + chrono::Duration::hours(1)),
            created,
            updated: created,
            user_id: None,
            is_guest: true,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["expirationType"], "time");
        assert_eq!(value["isGuest"], true);
        assert!(value.get("content").is_none());
        assert!(value.get("password").is_none());
    }
}
