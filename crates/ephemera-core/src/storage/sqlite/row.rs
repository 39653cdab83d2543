//! Raw row types for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{NoteError, Result};
use crate::storage::types::{Account, Note};

pub(crate) const NOTE_COLUMNS: &str = "id, title, content, expiration_type, expiration, \
     password_protected, password, created, updated, user_id, is_guest";

pub(crate) const ACCOUNT_COLUMNS: &str = "id, email, name, password_hash, created, updated";

/// Raw row data from the notes table, before parsing into domain types.
#[derive(Debug)]
pub struct NoteRow {
    pub id: String,
    pub title: Option<String>,
    pub content: String,
    pub expiration_type: String,
    pub expiration: Option<String>,
    pub password_protected: bool,
    pub password: Option<String>,
    pub created: String,
    pub updated: String,
    pub user_id: Option<String>,
    pub is_guest: bool,
}

impl NoteRow {
    /// Read a row selected with [`NOTE_COLUMNS`].
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            expiration_type: row.get(3)?,
            expiration: row.get(4)?,
            password_protected: row.get(5)?,
            password: row.get(6)?,
            created: row.get(7)?,
            updated: row.get(8)?,
            user_id: row.get(9)?,
            is_guest: row.get(10)?,
        })
    }
}

fn parse_uuid(value: &str, column: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| NoteError::InvalidState(format!("Invalid {} UUID: {}", column, e)))
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| NoteError::InvalidState(format!("Invalid {} timestamp: {}", column, e)))
}

impl TryFrom<NoteRow> for Note {
    type Error = NoteError;

    fn try_from(row: NoteRow) -> Result<Self> {
        let id = parse_uuid(&row.id, "note")?;
        let expiration_type = row.expiration_type.parse().map_err(|_| {
            NoteError::InvalidState(format!("Unknown expiration type: {}", row.expiration_type))
        })?;
        if row.password_protected != row.password.is_some() {
            return Err(NoteError::InvalidState(
                "Password column disagrees with protection flag".to_string(),
            ));
        }
        let user_id = row
            .user_id
            .as_deref()
            .map(|value| parse_uuid(value, "owner"))
            .transpose()?;

        Ok(Note {
            id,
            title: row.title,
            content: row.content,
            expiration_type,
            expiration: row.expiration,
            password_protected: row.password_protected,
            password: row.password,
            created: parse_timestamp(&row.created, "created")?,
            updated: parse_timestamp(&row.updated, "updated")?,
            user_id,
            is_guest: row.is_guest,
        })
    }
}

/// Raw row data from the accounts table.
#[derive(Debug)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created: String,
    pub updated: String,
}

impl AccountRow {
    /// Read a row selected with [`ACCOUNT_COLUMNS`].
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            password_hash: row.get(3)?,
            created: row.get(4)?,
            updated: row.get(5)?,
        })
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = NoteError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(Account {
            id: parse_uuid(&row.id, "account")?,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            created: parse_timestamp(&row.created, "created")?,
            updated: parse_timestamp(&row.updated, "updated")?,
        })
    }
}
