use thiserror::Error;

/// Why a single CSV row could not become a `ShipmentRecord`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowErrorKind {
    #[error("expected {expected} columns, got {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("invalid integer {value:?}: {reason}")]
    InvalidInteger { value: String, reason: String },

    #[error("invalid timestamp {value:?} (expected YYYY-MM-DD HH:MM): {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// A row that failed to parse. `row` counts the header as row 0, so the first
/// data row is row 1. `column` is the CSV header name of the offending column,
/// absent when the row shape itself is wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}{}: {kind}", .column.map(|c| format!(", column {}", c)).unwrap_or_default())]
pub struct MalformedRowError {
    pub row: usize,
    pub column: Option<&'static str>,
    pub kind: RowErrorKind,
}

/// Failure converting a whole CSV document into records.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("CSV document has no header row")]
    Empty,

    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Row(#[from] MalformedRowError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_row_and_column() {
        let err = MalformedRowError {
            row: 3,
            column: Some("SpedNr"),
            kind: RowErrorKind::InvalidInteger {
                value: "abc".into(),
                reason: "invalid digit found in string".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "row 3, column SpedNr: invalid integer \"abc\": invalid digit found in string"
        );
    }

    #[test]
    fn message_without_column() {
        let err = MalformedRowError {
            row: 2,
            column: None,
            kind: RowErrorKind::ColumnCount {
                expected: 22,
                found: 5,
            },
        };
        assert_eq!(err.to_string(), "row 2: expected 22 columns, got 5");
    }
}
