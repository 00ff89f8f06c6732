use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the CSV payload of an import came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportSource {
    /// The `datafile` multipart field, with the client supplied file name.
    File { name: String },
    /// The `data` text field.
    Pasted,
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::File { name } => write!(f, "file '{}'", name),
            ImportSource::Pasted => f.write_str("pasted data"),
        }
    }
}

/// Outcome of a committed import, rendered on the success page and returned
/// as JSON by `POST /api/import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub import_id: String,
    pub source: ImportSource,
    /// Data rows written by this import (header excluded).
    pub rows_upserted: usize,
    /// Rows in the table after the commit; `None` when counting failed after
    /// the batch was already committed.
    pub rows_stored: Option<i64>,
    /// Hex md5 digest of the raw payload bytes.
    pub md5: String,
    pub elapsed_ms: u64,
}
