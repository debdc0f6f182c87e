//! Core data-management logic for the phonebook.
//! This crate owns the contact schema and every validation rule.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{DatabaseLocation, StoreConfig, DEFAULT_BUSY_TIMEOUT};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{
    is_valid_phone, validate_phone, Contact, ContactField, ContactValidationError, ImportRow,
    RejectedRow,
};
pub use repo::contact_repo::{
    ContactListQuery, ContactRepository, RepoError, RepoResult, SqliteContactRepository,
};
pub use service::phonebook_service::{
    BulkImportReport, InputError, PageRequest, PhonebookStore, StoreError, StoreResult,
    SHOW_ALL_LIMIT,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
