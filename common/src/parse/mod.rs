//! CSV text to typed records.
//!
//! - `row`: the Row Parser, one record at a time through a [`ColumnLayout`].
//! - `batch`: the Batch Converter, reading a whole uploaded document.
//!
//! [`ColumnLayout`]: crate::schema::ColumnLayout

mod batch;
mod row;

pub use batch::{convert_document, detect_delimiter, Delimiter};
pub use row::parse_row;
