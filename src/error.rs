//! Error types shared by the sequencer, the import pipeline and the stores

use thiserror::Error;

use crate::types::ImportSummary;

/// Row-level validation failure. Recorded in the import summary, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Invalid {field}: '{value}'")]
    InvalidValue { field: String, value: String },
}

/// Rejected route operation. The input route is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

/// Failure reported by a record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("{0}")]
    Unavailable(String),
}

/// Failure of a whole bulk import call.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Reader failure. Contents arrive as UTF-8 text and field counts are
    /// checked separately, so this only carries errors the reader itself raises.
    #[error("Malformed CSV: {0}")]
    Parse(#[from] csv::Error),
    #[error("CSV has no header row")]
    MissingHeader,
    #[error("Malformed CSV: column '{0}' appears more than once")]
    DuplicateColumn(String),
    #[error("Malformed CSV: line {line} has {found} fields, header has {expected}")]
    FieldCount { line: u64, expected: usize, found: usize },
    #[error("Import cancelled after {} rows", .0.total)]
    Cancelled(ImportSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_columns() {
        let err = RowError::MissingFields(vec!["customerCity".into(), "customerPostcode".into()]);
        assert_eq!(err.to_string(), "Missing required fields: customerCity, customerPostcode");
    }

    #[test]
    fn test_reader_failure_converts_to_parse_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "stream closed");
        let err = ImportError::from(csv::Error::from(io));
        assert!(matches!(err, ImportError::Parse(_)));
        assert!(err.to_string().starts_with("Malformed CSV: "));
    }

    #[test]
    fn test_not_found_message() {
        let err = StoreError::NotFound { kind: "Delivery", id: 7 };
        assert_eq!(err.to_string(), "Delivery not found");
    }
}
