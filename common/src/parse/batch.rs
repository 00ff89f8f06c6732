use super::row::parse_row;
use crate::error::ConvertError;
use crate::model::shipment::ShipmentRecord;
use crate::schema::ColumnLayout;
use csv::{ByteRecord, ReaderBuilder, Trim};
use log::debug;
use rayon::prelude::*;
use std::str::FromStr;

/// Field separator of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    Comma,
    Semicolon,
    /// Guess from the header line.
    #[default]
    Auto,
}

impl Delimiter {
    pub fn byte_for(self, document: &[u8]) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Auto => detect_delimiter(document),
        }
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" | "," => Ok(Delimiter::Comma),
            "semicolon" | ";" => Ok(Delimiter::Semicolon),
            "auto" | "" => Ok(Delimiter::Auto),
            other => Err(format!("unknown CSV delimiter '{}'", other)),
        }
    }
}

const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Picks the candidate separator that occurs most often in the first
/// non-blank line, which is the header once the reader skips blank lines.
/// Ties go to the earlier candidate; a line with none of them is comma.
pub fn detect_delimiter(document: &[u8]) -> u8 {
    let line = document
        .split(|&b| b == b'\n')
        .find(|line| !line.trim_ascii().is_empty())
        .unwrap_or_default();
    let mut best = (b',', 0usize);
    for candidate in CANDIDATES {
        let count = line.iter().filter(|&&b| b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Converts a full CSV document into records, header row skipped.
///
/// Fails on the first malformed row (lowest row index), never returning a
/// partial batch. Output order follows input order.
pub fn convert_document(
    document: &[u8],
    delimiter: Delimiter,
) -> Result<Vec<ShipmentRecord>, ConvertError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.byte_for(document))
        .has_headers(false)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(document);

    let mut records = reader.byte_records();
    let header = match records.next() {
        Some(record) => decode(&record?),
        None => return Err(ConvertError::Empty),
    };
    let layout = ColumnLayout::resolve(&header)?;
    debug!(
        "resolved {:?} column layout, {} fields per row",
        layout.kind(),
        layout.width()
    );

    let rows: Vec<Vec<String>> = records
        .map(|record| record.map(|r| decode(&r)))
        .collect::<Result<_, _>>()?;

    let parsed: Vec<_> = rows
        .par_iter()
        .enumerate()
        .map(|(i, fields)| parse_row(i + 1, fields, &layout))
        .collect();

    // Sequential collect stops at the earliest failing row.
    parsed
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(ConvertError::from)
}

/// Invalid UTF-8 sequences are dropped from a field rather than rejected.
fn decode(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| match std::str::from_utf8(field) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(field).replace(char::REPLACEMENT_CHARACTER, ""),
        })
        .collect()
}
