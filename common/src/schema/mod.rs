//! # Shipment Column Schema
//!
//! Describes the 22 columns of the `export_shipments` table by name rather
//! than by position. Every CSV upload starts with a header row, and
//! [`ColumnLayout::resolve`] turns that header into a mapping from schema
//! column to CSV position:
//!
//! - **Named**: the header names every column (either the table header such as
//!   `SpedNr` or the field name such as `shipment_number`, case-insensitive).
//!   Columns may then appear in any order and extra columns are ignored.
//! - **Positional**: the header is 22 columns wide, in table order; or 23
//!   columns wide when the export carries a leading row-index column.
//!
//! The Row Parser only ever asks the layout for "the position of column X", so
//! reordering columns in a named export does not break an import.

use crate::error::{MalformedRowError, RowErrorKind};

/// Number of columns in a shipment row.
pub const COLUMN_COUNT: usize = 22;

/// The only accepted timestamp layout, e.g. `2024-01-01 10:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Required integer primary key.
    Key,
    /// Optional text, empty is null.
    Text,
    /// Optional integer, empty is null.
    Integer,
    /// Optional timestamp in [`TIMESTAMP_FORMAT`], empty is null.
    Timestamp,
    /// Boolean, case-insensitive `true`; anything else is false.
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ShipmentNumber,
    AirWaybill,
    RegistrationDate,
    CreatedDate,
    ArrivalScanTime,
    GatewayCode,
    ShipperName,
    LastSignature,
    ProductCode,
    LineItemCount,
    HoldCode,
    HoldCodeDate,
    CustomsStatus,
    CustomsStatusTime,
    ControlCheck,
    ControlDate,
    BpoCheck,
    BpoDate,
    ErrorCheck,
    ErrorDate,
    Image,
    ImageDate,
}

impl Column {
    pub fn spec(self) -> &'static ColumnSpec {
        &SHIPMENT_COLUMNS[self as usize]
    }

    pub fn header(self) -> &'static str {
        self.spec().header
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column: Column,
    /// Column name in the database table and in exported CSV headers.
    pub header: &'static str,
    /// Field name on `ShipmentRecord`, also accepted as a CSV header.
    pub field: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    const fn new(column: Column, header: &'static str, field: &'static str, kind: ColumnKind) -> Self {
        Self {
            column,
            header,
            field,
            kind,
        }
    }

    /// Whether a CSV header cell names this column.
    pub fn matches(&self, cell: &str) -> bool {
        let name = cell.trim_start_matches('\u{feff}').trim();
        name.eq_ignore_ascii_case(self.header) || name.eq_ignore_ascii_case(self.field)
    }
}

/// Table order. The discriminant of each [`Column`] indexes this array.
pub const SHIPMENT_COLUMNS: [ColumnSpec; COLUMN_COUNT] = [
    ColumnSpec::new(Column::ShipmentNumber, "SpedNr", "shipment_number", ColumnKind::Key),
    ColumnSpec::new(Column::AirWaybill, "AWB", "air_waybill", ColumnKind::Text),
    ColumnSpec::new(Column::RegistrationDate, "RegDate", "registration_date", ColumnKind::Timestamp),
    ColumnSpec::new(Column::CreatedDate, "CreatedDate", "created_date", ColumnKind::Timestamp),
    ColumnSpec::new(Column::ArrivalScanTime, "ArrivalScan", "arrival_scan_time", ColumnKind::Timestamp),
    ColumnSpec::new(Column::GatewayCode, "GTW", "gateway_code", ColumnKind::Text),
    ColumnSpec::new(Column::ShipperName, "ShipperName", "shipper_name", ColumnKind::Text),
    ColumnSpec::new(Column::LastSignature, "LastSign", "last_signature", ColumnKind::Text),
    ColumnSpec::new(Column::ProductCode, "ProductCode", "product_code", ColumnKind::Text),
    ColumnSpec::new(Column::LineItemCount, "LineItems", "line_item_count", ColumnKind::Integer),
    ColumnSpec::new(Column::HoldCode, "HoldCode", "hold_code", ColumnKind::Text),
    ColumnSpec::new(Column::HoldCodeDate, "HoldCodeDate", "hold_code_date", ColumnKind::Timestamp),
    ColumnSpec::new(Column::CustomsStatus, "TullStatus", "customs_status", ColumnKind::Text),
    ColumnSpec::new(Column::CustomsStatusTime, "TullStatusDT", "customs_status_time", ColumnKind::Timestamp),
    ColumnSpec::new(Column::ControlCheck, "ControllCheck", "control_check", ColumnKind::Flag),
    ColumnSpec::new(Column::ControlDate, "ControllDate", "control_date", ColumnKind::Timestamp),
    ColumnSpec::new(Column::BpoCheck, "BPOCheck", "bpo_check", ColumnKind::Flag),
    ColumnSpec::new(Column::BpoDate, "BPODate", "bpo_date", ColumnKind::Timestamp),
    ColumnSpec::new(Column::ErrorCheck, "ErrorCheck", "error_check", ColumnKind::Flag),
    ColumnSpec::new(Column::ErrorDate, "ErrorDate", "error_date", ColumnKind::Timestamp),
    ColumnSpec::new(Column::Image, "Image", "image", ColumnKind::Text),
    ColumnSpec::new(Column::ImageDate, "ImageDate", "image_date", ColumnKind::Timestamp),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Named,
    Positional,
}

/// Where each schema column sits in a CSV row, and how wide rows must be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    positions: [usize; COLUMN_COUNT],
    width: usize,
    kind: LayoutKind,
}

impl ColumnLayout {
    /// Table order starting at `offset` (1 when a row-index column leads).
    pub fn positional(offset: usize) -> Self {
        let mut positions = [0; COLUMN_COUNT];
        for (i, slot) in positions.iter_mut().enumerate() {
            *slot = i + offset;
        }
        Self {
            positions,
            width: COLUMN_COUNT + offset,
            kind: LayoutKind::Positional,
        }
    }

    /// Builds the layout from the header row (row 0).
    pub fn resolve<S: AsRef<str>>(header: &[S]) -> Result<Self, MalformedRowError> {
        let mut positions = [None; COLUMN_COUNT];
        for (pos, cell) in header.iter().enumerate() {
            if let Some(spec) = SHIPMENT_COLUMNS.iter().find(|s| s.matches(cell.as_ref())) {
                positions[spec.column as usize].get_or_insert(pos);
            }
        }

        if positions.iter().all(Option::is_some) {
            return Ok(Self {
                positions: positions.map(|p| p.unwrap_or_default()),
                width: header.len(),
                kind: LayoutKind::Named,
            });
        }

        match header.len() {
            COLUMN_COUNT => Ok(Self::positional(0)),
            n if n == COLUMN_COUNT + 1 => Ok(Self::positional(1)),
            found => Err(MalformedRowError {
                row: 0,
                column: None,
                kind: RowErrorKind::ColumnCount {
                    expected: COLUMN_COUNT,
                    found,
                },
            }),
        }
    }

    pub fn position(&self, column: Column) -> usize {
        self.positions[column as usize]
    }

    /// Number of fields every data row must carry.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }
}
