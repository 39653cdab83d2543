//! SQLite storage backend.
//!
//! A single connection guarded by a mutex: every statement runs to completion
//! before the next begins, so a `DELETE` is the serialization point between
//! concurrent readers of the same note.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::warn;
use uuid::Uuid;

use crate::error::{NoteError, Result};
use crate::storage::traits::{AccountStore, NoteStore};
use crate::storage::types::{Account, NewAccount, NewNoteRecord, Note, NoteScope, NoteUpdate};

pub use row::{AccountRow, NoteRow};
use row::{ACCOUNT_COLUMNS, NOTE_COLUMNS};

/// Current on-disk format version.
pub const FORMAT_VERSION: &str = "0.1";

/// SQLite-backed note and account store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    const BUSY_TIMEOUT_MS: u64 = 5_000;

    /// Open (or create) a database file and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::Storage` if the parent directory does not exist,
    /// or `NoteError::Sqlite` if the file is not a usable database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(NoteError::Storage(format!(
                    "Database directory does not exist: {}",
                    parent.display()
                )));
            }
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_millis(Self::BUSY_TIMEOUT_MS))?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                password_hash TEXT NOT NULL,
                created TEXT NOT NULL,
                updated TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT,
                content TEXT NOT NULL,
                expiration_type TEXT NOT NULL,
                expiration TEXT,
                password_protected INTEGER NOT NULL,
                password TEXT,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                user_id TEXT,
                is_guest INTEGER NOT NULL,

                FOREIGN KEY(user_id) REFERENCES accounts(id)
            );

            CREATE INDEX IF NOT EXISTS notes_user_id ON notes(user_id);
            CREATE INDEX IF NOT EXISTS notes_is_guest ON notes(is_guest);
            "#,
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?)",
            [FORMAT_VERSION],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| NoteError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Fixed-width timestamps so lexical order matches chronological order.
    fn timestamp(value: DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    fn query_note(conn: &Connection, id: &Uuid) -> Result<Option<Note>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS),
                [id.to_string()],
                NoteRow::from_row,
            )
            .optional()?;
        row.map(Note::try_from).transpose()
    }

    fn query_account(conn: &Connection, id: &Uuid) -> Result<Option<Account>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS),
                [id.to_string()],
                AccountRow::from_row,
            )
            .optional()?;
        row.map(Account::try_from).transpose()
    }

    fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
        )
    }
}

impl NoteStore for SqliteStore {
    fn create_note(&self, record: &NewNoteRecord) -> Result<Note> {
        let conn = self.lock()?;
        let id = Uuid::new_v4();
        let created = Self::timestamp(record.created);

        conn.execute(
            r#"
            INSERT INTO notes (
                id,
                title,
                content,
                expiration_type,
                expiration,
                password_protected,
                password,
                created,
                updated,
                user_id,
                is_guest
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                id.to_string(),
                record.title,
                record.content,
                record.expiration_type.as_str(),
                record.expiration,
                record.password_protected(),
                record.password,
                created,
                created,
                record.user_id.map(|id| id.to_string()),
                record.is_guest,
            ],
        )?;

        Self::query_note(&conn, &id)?
            .ok_or_else(|| NoteError::Storage("Inserted note could not be read back".to_string()))
    }

    fn get_note(&self, id: &Uuid) -> Result<Option<Note>> {
        let conn = self.lock()?;
        Self::query_note(&conn, id)
    }

    fn update_note(&self, id: &Uuid, update: &NoteUpdate) -> Result<Note> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE notes SET title = ?, content = ?, updated = ? WHERE id = ?",
            rusqlite::params![
                update.title,
                update.content,
                Self::timestamp(update.updated),
                id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(NoteError::NotFound);
        }
        Self::query_note(&conn, id)?.ok_or(NoteError::NotFound)
    }

    fn delete_note(&self, id: &Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM notes WHERE id = ?", [id.to_string()])?;
        Ok(removed > 0)
    }

    fn list_notes(&self, scope: &NoteScope) -> Result<Vec<Note>> {
        let conn = self.lock()?;

        let (condition, param): (&str, Option<String>) = match scope {
            NoteScope::Owner(user_id) => ("WHERE user_id = ?", Some(user_id.to_string())),
            NoteScope::Guests => ("WHERE is_guest = 1", None),
            NoteScope::All => ("", None),
        };
        let query = format!(
            "SELECT {} FROM notes {} ORDER BY created DESC",
            NOTE_COLUMNS, condition
        );

        let mut stmt = conn.prepare(&query)?;
        let rows = match param {
            Some(value) => stmt
                .query_map([value], NoteRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], NoteRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };

        // A corrupt row must not hide the rest of the listing.
        let notes = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match Note::try_from(row) {
                    Ok(note) => Some(note),
                    Err(e) => {
                        warn!(note_id = %id, error = %e, "skipping malformed note row");
                        None
                    }
                }
            })
            .collect();
        Ok(notes)
    }

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock()?;

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(NoteError::Storage(format!(
                "SQLite integrity check failed: {}",
                integrity
            )));
        }

        let mut fk_stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut fk_rows = fk_stmt.query([])?;
        if fk_rows.next()?.is_some() {
            return Err(NoteError::Storage(
                "Foreign key violations found".to_string(),
            ));
        }

        let format_version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'format_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if format_version.is_none() {
            return Err(NoteError::Storage(
                "Missing format_version metadata".to_string(),
            ));
        }

        let mut stmt = conn.prepare(&format!("SELECT {} FROM notes", NOTE_COLUMNS))?;
        let rows = stmt
            .query_map([], NoteRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for row in rows {
            let id = row.id.clone();
            let note = Note::try_from(row)
                .map_err(|e| NoteError::InvalidState(format!("Note {}: {}", id, e)))?;
            note.policy()
                .map_err(|e| NoteError::InvalidState(format!("Note {}: {}", id, e)))?;
        }

        Ok(())
    }
}

impl AccountStore for SqliteStore {
    fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let conn = self.lock()?;
        let id = Uuid::new_v4();
        let created = Self::timestamp(account.created);

        conn.execute(
            r#"
            INSERT INTO accounts (id, email, name, password_hash, created, updated)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                id.to_string(),
                account.email,
                account.name,
                account.password_hash,
                created,
                created,
            ],
        )
        .map_err(|e| {
            if Self::is_unique_violation(&e) {
                NoteError::AccountExists
            } else {
                NoteError::from(e)
            }
        })?;

        Self::query_account(&conn, &id)?.ok_or_else(|| {
            NoteError::Storage("Inserted account could not be read back".to_string())
        })
    }

    fn get_account(&self, id: &Uuid) -> Result<Option<Account>> {
        let conn = self.lock()?;
        Self::query_account(&conn, id)
    }

    fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM accounts WHERE email = ?", ACCOUNT_COLUMNS),
                [email],
                AccountRow::from_row,
            )
            .optional()?;
        row.map(Account::try_from).transpose()
    }

    fn update_account_password(&self, id: &Uuid, password_hash: &str) -> Result<Account> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE accounts SET password_hash = ?, updated = ? WHERE id = ?",
            rusqlite::params![password_hash, Self::timestamp(Utc::now()), id.to_string()],
        )?;
        if changed == 0 {
            return Err(NoteError::InvalidCredentials);
        }
        Self::query_account(&conn, id)?.ok_or(NoteError::InvalidCredentials)
    }

    fn update_account_name(&self, id: &Uuid, name: Option<&str>) -> Result<Account> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE accounts SET name = ?, updated = ? WHERE id = ?",
            rusqlite::params![name, Self::timestamp(Utc::now()), id.to_string()],
        )?;
        if changed == 0 {
            return Err(NoteError::InvalidCredentials);
        }
        Self::query_account(&conn, id)?.ok_or(NoteError::InvalidCredentials)
    }

    fn count_notes_for_account(&self, id: &Uuid) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notes WHERE user_id = ?",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
