//! Contact domain model and validation.
//!
//! # Responsibility
//! - Define `Contact`, the only persisted entity.
//! - Define `ImportRow`/`RejectedRow` for validated bulk ingestion.
//!
//! # Invariants
//! - Accepted phone numbers match `^[0-9]{7,15}$` (ASCII digits only).
//! - Identity fields must be non-blank.
//! - `RejectedRow` carries the candidate row exactly as received.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{7,15}$").expect("valid phone regex"));

/// Field names of a contact, used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    FirstName,
    Surname,
    Phone,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::Surname => "surname",
            Self::Phone => "phone",
        }
    }
}

impl Display for ContactField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a candidate row was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    /// Field absent from the candidate row.
    MissingField(ContactField),
    /// Field present but blank after trim.
    EmptyField(ContactField),
    /// Phone does not match `^[0-9]{7,15}$`.
    InvalidPhone(String),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field `{field}`"),
            Self::EmptyField(field) => write!(f, "field `{field}` must not be blank"),
            Self::InvalidPhone(value) => {
                write!(f, "invalid phone `{value}`; expected 7-15 digits")
            }
        }
    }
}

impl Error for ContactValidationError {}

/// A stored phonebook entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contact {
    pub first_name: String,
    pub surname: String,
    pub phone: String,
}

impl Contact {
    pub fn new(
        first_name: impl Into<String>,
        surname: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            surname: surname.into(),
            phone: phone.into(),
        }
    }

    /// Returns the identity pair `(first_name, surname)`.
    pub fn identity(&self) -> (&str, &str) {
        (self.first_name.as_str(), self.surname.as_str())
    }
}

/// Candidate row for bulk import.
///
/// Fields are optional so rows from loosely-shaped sources (CSV without a
/// column, JSON without a key) still reach validation instead of failing
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ImportRow {
    pub fn new(
        first_name: impl Into<String>,
        surname: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            surname: Some(surname.into()),
            phone: Some(phone.into()),
        }
    }

    /// Validates the row and returns the contact it describes.
    ///
    /// Checks run in field order, so the first failing field is reported.
    pub fn validate(&self) -> Result<Contact, ContactValidationError> {
        let first_name = required(self.first_name.as_deref(), ContactField::FirstName)?;
        let surname = required(self.surname.as_deref(), ContactField::Surname)?;
        let phone = required(self.phone.as_deref(), ContactField::Phone)?;
        validate_phone(phone)?;
        Ok(Contact::new(first_name, surname, phone))
    }
}

/// A bulk-import row that failed validation, returned as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub row: ImportRow,
    pub reason: ContactValidationError,
}

/// Returns whether `phone` matches `^[0-9]{7,15}$`.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Validates phone format for import paths.
pub fn validate_phone(phone: &str) -> Result<(), ContactValidationError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(ContactValidationError::InvalidPhone(phone.to_string()))
    }
}

/// Returns the first identity field that is blank after trim, if any.
pub fn blank_identity_field(first_name: &str, surname: &str) -> Option<ContactField> {
    if first_name.trim().is_empty() {
        Some(ContactField::FirstName)
    } else if surname.trim().is_empty() {
        Some(ContactField::Surname)
    } else {
        None
    }
}

fn required(value: Option<&str>, field: ContactField) -> Result<&str, ContactValidationError> {
    match value {
        None => Err(ContactValidationError::MissingField(field)),
        Some(text) if text.trim().is_empty() => Err(ContactValidationError::EmptyField(field)),
        Some(text) => Ok(text),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        blank_identity_field, is_valid_phone, ContactField, ContactValidationError, ImportRow,
    };

    #[test]
    fn phone_accepts_seven_to_fifteen_digits() {
        assert!(is_valid_phone("5551234"));
        assert!(is_valid_phone("123456789012345"));
        assert!(!is_valid_phone("555123"));
        assert!(!is_valid_phone("1234567890123456"));
    }

    #[test]
    fn phone_rejects_separators_and_non_ascii_digits() {
        assert!(!is_valid_phone("555-0100"));
        assert!(!is_valid_phone("+15551234"));
        assert!(!is_valid_phone(" 5551234"));
        assert!(!is_valid_phone("5551234\n"));
        assert!(!is_valid_phone("٥٥٥١٢٣٤"));
    }

    #[test]
    fn import_row_reports_missing_before_invalid() {
        let row = ImportRow {
            first_name: Some("Cy".to_string()),
            surname: None,
            phone: Some("abc".to_string()),
        };
        assert_eq!(
            row.validate().unwrap_err(),
            ContactValidationError::MissingField(ContactField::Surname)
        );
    }

    #[test]
    fn import_row_rejects_blank_identity() {
        let row = ImportRow::new("  ", "Lee", "5551234");
        assert_eq!(
            row.validate().unwrap_err(),
            ContactValidationError::EmptyField(ContactField::FirstName)
        );
    }

    #[test]
    fn import_row_yields_contact_when_valid() {
        let contact = ImportRow::new("Ann", "Lee", "5551234").validate().unwrap();
        assert_eq!(contact.identity(), ("Ann", "Lee"));
        assert_eq!(contact.phone, "5551234");
    }

    #[test]
    fn blank_identity_field_reports_first_blank_field() {
        assert_eq!(blank_identity_field("Ann", "Lee"), None);
        assert_eq!(
            blank_identity_field("Ann", " "),
            Some(ContactField::Surname)
        );
        assert_eq!(blank_identity_field("", ""), Some(ContactField::FirstName));
    }
}
