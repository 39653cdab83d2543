//! Account registration, authentication and profile management.
//!
//! Accounts only own notes; they never bypass a note's password or expiry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crypto::{hash_password, validate_password, verify_password};
use crate::error::{NoteError, Result};
use crate::expiry::{Clock, SystemClock};
use crate::storage::{Account, AccountStore, NewAccount};

/// Maximum length of a display name in characters.
pub const MAX_NAME_CHARS: usize = 50;

/// Aggregate information about an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    pub total_notes: usize,
    pub member_since: DateTime<Utc>,
}

/// Trim and lowercase an email, rejecting obviously malformed input.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(NoteError::InvalidInput(format!(
            "Invalid email address: {}",
            email
        )));
    }
    Ok(email)
}

/// Trim a display name; blank names clear it.
///
/// Names may contain letters, digits, spaces and `-'.`.
pub fn normalize_name(name: &str) -> Result<Option<String>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(NoteError::Validation(format!(
            "Name too long (max {} characters)",
            MAX_NAME_CHARS
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, ' ' | '-' | '\'' | '.')))
    {
        return Err(NoteError::Validation(format!(
            "Name contains invalid character '{}'",
            bad
        )));
    }
    Ok(Some(name.to_string()))
}

/// Account operations over an [`AccountStore`].
pub struct AccountService<S: AccountStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: AccountStore> AccountService<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: AccountStore, C: Clock> AccountService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// - `NoteError::InvalidInput` for a malformed email
    /// - `NoteError::Validation` for a short password or bad name
    /// - `NoteError::AccountExists` if the email is already registered
    pub fn register(&self, email: &str, password: &str, name: Option<&str>) -> Result<Account> {
        let email = normalize_email(email)?;
        validate_password(password)?;
        let name = match name {
            Some(name) => normalize_name(name)?,
            None => None,
        };

        let account = self.store.create_account(&NewAccount {
            email,
            name,
            password_hash: hash_password(password)?,
            created: self.clock.now(),
        })?;
        info!(account_id = %account.id, "registered account");
        Ok(account)
    }

    /// Check an email and password pair.
    ///
    /// Unknown emails and wrong passwords are indistinguishable.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let email = email.trim().to_lowercase();
        let Some(account) = self.store.get_account_by_email(&email)? else {
            warn!("authentication failed");
            return Err(NoteError::InvalidCredentials);
        };
        if !verify_password(password, &account.password_hash)? {
            warn!(account_id = %account.id, "authentication failed");
            return Err(NoteError::InvalidCredentials);
        }
        Ok(account)
    }

    /// Replace an account's password after checking the current one.
    pub fn change_password(&self, id: &Uuid, current: &str, new: &str) -> Result<Account> {
        let account = self.get(id)?;
        if !verify_password(current, &account.password_hash)? {
            warn!(account_id = %id, "password change rejected");
            return Err(NoteError::InvalidCredentials);
        }
        validate_password(new)?;

        let account = self
            .store
            .update_account_password(id, &hash_password(new)?)?;
        info!(account_id = %id, "changed account password");
        Ok(account)
    }

    /// Set or clear an account's display name.
    pub fn update_name(&self, id: &Uuid, name: &str) -> Result<Account> {
        let name = normalize_name(name)?;
        self.get(id)?;
        self.store.update_account_name(id, name.as_deref())
    }

    pub fn stats(&self, id: &Uuid) -> Result<AccountStats> {
        let account = self.get(id)?;
        Ok(AccountStats {
            total_notes: self.store.count_notes_for_account(id)?,
            member_since: account.created,
        })
    }

    fn get(&self, id: &Uuid) -> Result<Account> {
        self.store
            .get_account(id)?
            .ok_or_else(|| NoteError::InvalidInput(format!("Account not found: {}", id)))
    }
}
