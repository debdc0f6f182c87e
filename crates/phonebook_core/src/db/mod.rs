//! Phonebook database: connection setup and the `phonebook` table schema.
//!
//! # Schema
//! - `phonebook(first_name, surname, phone)` keyed by `(first_name, surname)`.
//! - Both identity columns are `NOT NULL` and `CHECK`ed non-blank, so a row
//!   with an empty name cannot exist even when written outside the service.
//! - `phone` is `NOT NULL` but not format-checked; only bulk import filters
//!   phones, direct upsert stores them as given.
//! - `idx_phonebook_phone` backs delete-by-phone and phone substring search.
//!
//! # Connection contract
//! - Every connection from `open_db` has the busy timeout from `StoreConfig`,
//!   the `phonebook_fold` SQL function, and the schema at `latest_version()`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
pub(crate) use open::{fold_case, FOLD_FUNCTION};

pub type DbResult<T> = Result<T, DbError>;

/// Failure opening or preparing the phonebook database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was written by a newer build; it is left untouched.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Whether the failure came from another connection holding the lock
    /// past the configured busy timeout.
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(failure, _))
                if matches!(
                    failure.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "phonebook schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
