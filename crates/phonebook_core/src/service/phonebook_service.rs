//! Phonebook use-case service.
//!
//! # Responsibility
//! - Provide upsert, search, bulk import, pagination and delete entry points.
//! - Apply request validation before anything reaches the repository.
//!
//! # Invariants
//! - Bulk import persists a row only when it passes `ImportRow::validate`.
//! - Validation failures are returned as data, storage failures as errors.
//! - Direct upsert checks identity fields only; the phone is stored as given.
//! - Delete matches first name, surname or phone, so one key can remove
//!   contacts that are otherwise unrelated.

use crate::model::contact::{blank_identity_field, Contact, ImportRow, RejectedRow};
use crate::repo::contact_repo::{ContactListQuery, ContactRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;

/// Page size used by [`PhonebookStore::list_all`].
pub const SHOW_ALL_LIMIT: u32 = 1000;

pub type StoreResult<T> = Result<T, StoreError>;

/// Malformed request rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Identity field blank after trim.
    BlankField(&'static str),
    /// Pagination value is not a non-negative integer.
    InvalidPageValue {
        name: &'static str,
        value: String,
        message: String,
    },
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(name) => write!(f, "`{name}` must not be blank"),
            Self::InvalidPageValue {
                name,
                value,
                message,
            } => write!(
                f,
                "`{name}` must be a non-negative integer, got `{value}`: {message}"
            ),
        }
    }
}

impl Error for InputError {}

/// Error surfaced by phonebook store operations.
#[derive(Debug)]
pub enum StoreError {
    Input(InputError),
    /// Persistence could not be reached or the statement failed.
    StorageUnavailable(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(err) => write!(f, "invalid input: {err}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Input(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
        }
    }
}

impl From<InputError> for StoreError {
    fn from(value: InputError) -> Self {
        Self::Input(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::StorageUnavailable(value)
    }
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageRequest {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Parses raw caller input such as CLI arguments.
    pub fn parse(limit: &str, offset: &str) -> Result<Self, InputError> {
        Ok(Self {
            limit: parse_page_value("limit", limit)?,
            offset: parse_page_value("offset", offset)?,
        })
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkImportReport {
    /// Rows that passed validation and were upserted.
    pub accepted: usize,
    /// Rows that failed validation, in scan order.
    pub rejected: Vec<RejectedRow>,
}

/// Phonebook store over any [`ContactRepository`].
pub struct PhonebookStore<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> PhonebookStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts or replaces the phone for `(first_name, surname)`.
    ///
    /// # Errors
    /// - `InputError::BlankField` when an identity field is blank.
    /// - `StorageUnavailable` when the write fails.
    pub fn upsert(&self, first_name: &str, surname: &str, phone: &str) -> StoreResult<()> {
        if let Some(field) = blank_identity_field(first_name, surname) {
            return Err(InputError::BlankField(field.as_str()).into());
        }

        self.repo
            .upsert_contact(&Contact::new(first_name, surname, phone))?;
        info!("event=contact_upsert module=service status=ok");
        Ok(())
    }

    /// Returns every contact whose names contain `pattern` (ignoring case)
    /// or whose phone contains it.
    pub fn search(&self, pattern: &str) -> StoreResult<Vec<Contact>> {
        Ok(self.repo.search_contacts(pattern)?)
    }

    /// Validates every row, then upserts the accepted ones in one
    /// transaction.
    ///
    /// Rejected rows never block the others. A storage failure rolls the
    /// whole batch back, so either every accepted row is persisted or none.
    pub fn bulk_import<I>(&self, rows: I) -> StoreResult<BulkImportReport>
    where
        I: IntoIterator<Item = ImportRow>,
    {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for row in rows {
            match row.validate() {
                Ok(contact) => accepted.push(contact),
                Err(reason) => rejected.push(RejectedRow { row, reason }),
            }
        }

        if let Err(err) = self.repo.upsert_batch(&accepted) {
            warn!(
                "event=bulk_import module=service status=error accepted={} rejected={} error={}",
                accepted.len(),
                rejected.len(),
                err
            );
            return Err(err.into());
        }

        let report = BulkImportReport {
            accepted: accepted.len(),
            rejected,
        };
        info!(
            "event=bulk_import module=service status=ok accepted={} rejected={}",
            report.accepted,
            report.rejected.len()
        );
        Ok(report)
    }

    /// Returns one page ordered by `(first_name, surname)`.
    pub fn list(&self, page: PageRequest) -> StoreResult<Vec<Contact>> {
        let query = ContactListQuery {
            limit: page.limit,
            offset: page.offset,
        };
        Ok(self.repo.list_contacts(&query)?)
    }

    /// Returns the first [`SHOW_ALL_LIMIT`] contacts.
    pub fn list_all(&self) -> StoreResult<Vec<Contact>> {
        self.list(PageRequest::new(SHOW_ALL_LIMIT, 0))
    }

    /// Removes every contact whose first name, surname or phone equals `key`.
    ///
    /// Returns the number of removed contacts; zero is not an error.
    pub fn delete(&self, key: &str) -> StoreResult<usize> {
        let removed = self.repo.delete_matching(key)?;
        info!("event=contact_delete module=service status=ok removed={removed}");
        Ok(removed)
    }
}

fn parse_page_value(name: &'static str, raw: &str) -> Result<u32, InputError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|err: ParseIntError| InputError::InvalidPageValue {
            name,
            value: raw.to_string(),
            message: err.to_string(),
        })
}
