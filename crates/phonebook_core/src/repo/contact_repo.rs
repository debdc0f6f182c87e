//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert/search/list/delete over the `phonebook` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Upsert is keyed on `(first_name, surname)` and never duplicates.
//! - Listing is ordered by `first_name, surname` ascending.
//! - Search patterns are matched literally; names are compared after a
//!   Unicode lowercase fold, phones as-is.
//! - A batch upsert commits every contact or none.

use crate::db::{fold_case, DbError, FOLD_FUNCTION};
use crate::model::contact::Contact;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    first_name,
    surname,
    phone
FROM phonebook";

const UPSERT_SQL: &str = "INSERT INTO phonebook (first_name, surname, phone)
     VALUES (?1, ?2, ?3)
     ON CONFLICT (first_name, surname) DO UPDATE SET phone = excluded.phone;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Row fetched from storage does not satisfy the table contract.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Window over the identity-ordered contact list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactListQuery {
    pub limit: u32,
    pub offset: u32,
}

/// Data-access contract for phonebook storage.
pub trait ContactRepository {
    /// Inserts a contact, or replaces the phone of an existing identity.
    fn upsert_contact(&self, contact: &Contact) -> RepoResult<()>;
    /// Upserts `contacts` in order inside one transaction.
    ///
    /// On error nothing from the batch is persisted.
    fn upsert_batch(&self, contacts: &[Contact]) -> RepoResult<()>;
    /// Case-insensitive substring match on names, plain substring on phone.
    fn search_contacts(&self, pattern: &str) -> RepoResult<Vec<Contact>>;
    /// Returns one identity-ordered page.
    fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<Vec<Contact>>;
    /// Deletes every contact with any field equal to `key`; returns the count.
    fn delete_matching(&self, key: &str) -> RepoResult<usize>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Wraps a connection returned by `open_db`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Number of stored contacts.
    pub fn count_contacts(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM phonebook;", [], |row| {
                row.get::<_, i64>(0)
            })?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn upsert_contact(&self, contact: &Contact) -> RepoResult<()> {
        execute_upsert(self.conn, contact)
    }

    fn upsert_batch(&self, contacts: &[Contact]) -> RepoResult<()> {
        // Dropping `tx` on an early return rolls the batch back.
        let tx = self.conn.unchecked_transaction()?;
        for contact in contacts {
            execute_upsert(&tx, contact)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn search_contacts(&self, pattern: &str) -> RepoResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             WHERE ?2 = ''
                OR instr({FOLD_FUNCTION}(first_name), ?1) > 0
                OR instr({FOLD_FUNCTION}(surname), ?1) > 0
                OR instr(phone, ?2) > 0
             ORDER BY first_name ASC, surname ASC;"
        ))?;

        let mut rows = stmt.query(params![fold_case(pattern), pattern])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             ORDER BY first_name ASC, surname ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;

        let mut rows = stmt.query(params![i64::from(query.limit), i64::from(query.offset)])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn delete_matching(&self, key: &str) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM phonebook
             WHERE first_name = ?1
                OR surname = ?1
                OR phone = ?1;",
            [key],
        )?;
        Ok(changed)
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let first_name: String = row.get("first_name")?;
    let surname: String = row.get("surname")?;
    if first_name.is_empty() || surname.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank identity `({first_name}, {surname})` in phonebook"
        )));
    }

    Ok(Contact {
        first_name,
        surname,
        phone: row.get("phone")?,
    })
}

fn execute_upsert(conn: &Connection, contact: &Contact) -> RepoResult<()> {
    conn.execute(
        UPSERT_SQL,
        params![
            contact.first_name.as_str(),
            contact.surname.as_str(),
            contact.phone.as_str(),
        ],
    )?;
    Ok(())
}
