//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data-access contract the phonebook service is written
//!   against.
//! - Isolate SQLite query details from validation and orchestration.
//!
//! # Invariants
//! - Each repository write is a single atomic statement.
//! - Repositories do not validate phone format; that belongs to the service.

pub mod contact_repo;
