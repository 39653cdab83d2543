//! Expiration policies and the expiration evaluator.
//!
//! Time-based expiry is never stored as an absolute deadline. The deadline is
//! recomputed from the note's creation time and its window on every access,
//! and a note is expired only when `now` is strictly after that deadline.
//!
//! View-once exhaustion is not decided here: the access-control engine
//! deletes a view-once note when it discloses it.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NoteError, Result};
use crate::storage::Note;

/// The declared expiration kind of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationType {
    Never,
    Time,
    View,
}

impl ExpirationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpirationType::Never => "never",
            ExpirationType::Time => "time",
            ExpirationType::View => "view",
        }
    }
}

impl fmt::Display for ExpirationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpirationType {
    type Err = NoteError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "never" => Ok(ExpirationType::Never),
            "time" => Ok(ExpirationType::Time),
            "view" => Ok(ExpirationType::View),
            other => Err(NoteError::InvalidExpiration(format!(
                "Unknown expiration type: {} (use never, time or view)",
                other
            ))),
        }
    }
}

/// The fixed set of lifetimes a time-based note may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryWindow {
    FiveMinutes,
    OneHour,
    OneDay,
    SevenDays,
    ThirtyDays,
}

impl ExpiryWindow {
    pub const ALL: [ExpiryWindow; 5] = [
        ExpiryWindow::FiveMinutes,
        ExpiryWindow::OneHour,
        ExpiryWindow::OneDay,
        ExpiryWindow::SevenDays,
        ExpiryWindow::ThirtyDays,
    ];

    /// The friendly label persisted with the note (e.g. `"1 hour"`).
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryWindow::FiveMinutes => "5 minutes",
            ExpiryWindow::OneHour => "1 hour",
            ExpiryWindow::OneDay => "1 day",
            ExpiryWindow::SevenDays => "7 days",
            ExpiryWindow::ThirtyDays => "30 days",
        }
    }

    /// Amount and unit (`m`, `h` or `d`) of the window.
    pub fn amount_and_unit(&self) -> (i64, char) {
        match self {
            ExpiryWindow::FiveMinutes => (5, 'm'),
            ExpiryWindow::OneHour => (1, 'h'),
            ExpiryWindow::OneDay => (1, 'd'),
            ExpiryWindow::SevenDays => (7, 'd'),
            ExpiryWindow::ThirtyDays => (30, 'd'),
        }
    }

    /// Compact form of the window (e.g. `"1h"`).
    pub fn compact(&self) -> String {
        let (amount, unit) = self.amount_and_unit();
        format!("{}{}", amount, unit)
    }

    pub fn duration(&self) -> Duration {
        let (amount, unit) = self.amount_and_unit();
        match unit {
            'm' => Duration::minutes(amount),
            'h' => Duration::hours(amount),
            _ => Duration::days(amount),
        }
    }
}

impl fmt::Display for ExpiryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpiryWindow {
    type Err = NoteError;

    /// Accepts the friendly labels and their compact forms (`5m`, `1h`, `1d`, `7d`, `30d`).
    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        ExpiryWindow::ALL
            .into_iter()
            .find(|window| window.label() == trimmed || window.compact() == trimmed)
            .ok_or_else(|| {
                NoteError::InvalidExpirationFormat(format!(
                    "{:?} (use one of: 5 minutes, 1 hour, 1 day, 7 days, 30 days)",
                    value
                ))
            })
    }
}

/// A note's expiration policy, decided once at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// Never expires automatically.
    Never,
    /// Expires once the window has elapsed since creation.
    Time(ExpiryWindow),
    /// Deleted on its first successful disclosure.
    View,
}

impl ExpirationPolicy {
    /// Build a policy from its persisted parts.
    ///
    /// The expiration string is required for `time` and ignored otherwise.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::InvalidExpirationFormat` if a time-based policy has
    /// a missing or unrecognized window.
    pub fn from_parts(expiration_type: ExpirationType, expiration: Option<&str>) -> Result<Self> {
        match expiration_type {
            ExpirationType::Never => Ok(ExpirationPolicy::Never),
            ExpirationType::View => Ok(ExpirationPolicy::View),
            ExpirationType::Time => {
                let raw = expiration.ok_or_else(|| {
                    NoteError::InvalidExpirationFormat(
                        "time-based expiration requires a window".to_string(),
                    )
                })?;
                Ok(ExpirationPolicy::Time(raw.parse()?))
            }
        }
    }

    pub fn expiration_type(&self) -> ExpirationType {
        match self {
            ExpirationPolicy::Never => ExpirationType::Never,
            ExpirationPolicy::Time(_) => ExpirationType::Time,
            ExpirationPolicy::View => ExpirationType::View,
        }
    }

    /// The label persisted in the note's `expiration` column, if any.
    pub fn expiration_label(&self) -> Option<&'static str> {
        match self {
            ExpirationPolicy::Time(window) => Some(window.label()),
            _ => None,
        }
    }

    pub fn is_view_once(&self) -> bool {
        matches!(self, ExpirationPolicy::View)
    }

    /// The computed deadline of a time-based note.
    pub fn expires_at(&self, created: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ExpirationPolicy::Time(window) => Some(created + window.duration()),
            _ => None,
        }
    }

    /// Whether a note with this policy is past its deadline at `now`.
    ///
    /// The deadline instant itself is still viewable.
    pub fn is_expired(&self, created: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.expires_at(created) {
            Some(deadline) => now > deadline,
            None => false,
        }
    }
}

/// Evaluate a persisted note's expiration at `now`.
///
/// # Errors
///
/// Returns `NoteError::InvalidExpirationFormat` when the stored expiration
/// cannot be parsed. Malformed data is never treated as expired or as
/// non-expiring.
pub fn is_expired(note: &Note, now: DateTime<Utc>) -> Result<bool> {
    let policy = note.policy()?;
    Ok(policy.is_expired(note.created, now))
}

/// Source of the current time for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
