//! Phonebook domain model.
//!
//! # Responsibility
//! - Define the contact record and bulk-import row shapes.
//! - Own the phone/identity validation rules used by import paths.
//!
//! # Invariants
//! - A contact is identified by the ordered pair `(first_name, surname)`.
//! - Validation is pure and never touches storage.

pub mod contact;
