//! CSV source for bulk import.
//!
//! # Responsibility
//! - Normalize user-typed file paths.
//! - Read `first_name,surname,phone` CSV files into `ImportRow`s.
//!
//! # Invariants
//! - Field values are trimmed.
//! - A blank cell yields `Some("")` and an absent column or short row yields
//!   `None`, so the store rejects them as empty and missing respectively.
//! - A header must name at least one contact column.

use csv::{ReaderBuilder, StringRecord, Trim};
use phonebook_core::ImportRow;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CsvSourceError {
    NotFound(PathBuf),
    /// Header row names none of `first_name`, `surname`, `phone`.
    NoContactColumns(PathBuf),
    Csv(csv::Error),
}

impl Display for CsvSourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "csv file not found: {}", path.display()),
            Self::NoContactColumns(path) => write!(
                f,
                "csv header in {} has no first_name, surname or phone column",
                path.display()
            ),
            Self::Csv(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CsvSourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) | Self::NoContactColumns(_) => None,
            Self::Csv(err) => Some(err),
        }
    }
}

impl From<csv::Error> for CsvSourceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Strips surrounding whitespace and quotes and converts `\` separators.
pub fn normalize_path(raw: &str) -> PathBuf {
    let cleaned = raw.trim().trim_matches('"').replace('\\', "/");
    PathBuf::from(cleaned)
}

/// Header positions of the contact columns.
struct ColumnIndex {
    first_name: Option<usize>,
    surname: Option<usize>,
    phone: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|header| header == name);
        Self {
            first_name: position("first_name"),
            surname: position("surname"),
            phone: position("phone"),
        }
    }

    fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.surname.is_none() && self.phone.is_none()
    }

    fn row(&self, record: &StringRecord) -> ImportRow {
        let cell = |index: Option<usize>| index.and_then(|i| record.get(i)).map(str::to_string);
        ImportRow {
            first_name: cell(self.first_name),
            surname: cell(self.surname),
            phone: cell(self.phone),
        }
    }
}

/// Reads every data row of the CSV file at `path`.
pub fn read_import_rows(path: &Path) -> Result<Vec<ImportRow>, CsvSourceError> {
    if !path.is_file() {
        return Err(CsvSourceError::NotFound(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let columns = ColumnIndex::from_headers(reader.headers()?);
    if columns.is_empty() {
        return Err(CsvSourceError::NoContactColumns(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(columns.row(&record?));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{normalize_path, read_import_rows, CsvSourceError};
    use phonebook_core::{ContactField, ContactValidationError, ImportRow};
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn normalize_path_strips_quotes_and_backslashes() {
        assert_eq!(
            normalize_path("  \"C:\\data\\contacts.csv\" "),
            PathBuf::from("C:/data/contacts.csv")
        );
    }

    #[test]
    fn reads_rows_and_keeps_invalid_values_for_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        fs::write(
            &path,
            "first_name,surname,phone\n Ann , Lee ,5551234\nCy,Pat,abc\n",
        )
        .unwrap();

        let rows = read_import_rows(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                ImportRow::new("Ann", "Lee", "5551234"),
                ImportRow::new("Cy", "Pat", "abc"),
            ]
        );
    }

    #[test]
    fn missing_column_yields_none_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        fs::write(&path, "first_name,phone\nAnn,5551234\n").unwrap();

        let rows = read_import_rows(&path).unwrap();
        assert_eq!(rows[0].surname, None);
        assert_eq!(rows[0].first_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn blank_cell_is_kept_as_empty_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        fs::write(&path, "first_name,surname,phone\nAnn,  ,5551234\nBob,Lee\n").unwrap();

        let rows = read_import_rows(&path).unwrap();
        assert_eq!(rows[0].surname.as_deref(), Some(""));
        assert_eq!(
            rows[0].validate().unwrap_err(),
            ContactValidationError::EmptyField(ContactField::Surname)
        );
        assert_eq!(rows[1].phone, None);
        assert_eq!(
            rows[1].validate().unwrap_err(),
            ContactValidationError::MissingField(ContactField::Phone)
        );
    }

    #[test]
    fn header_without_contact_columns_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        fs::write(&path, "name,number\nAnn,5551234\n").unwrap();

        let err = read_import_rows(&path).unwrap_err();
        assert!(matches!(err, CsvSourceError::NoContactColumns(_)));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_import_rows(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, CsvSourceError::NotFound(_)));
    }
}
