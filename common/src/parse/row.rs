use crate::error::{MalformedRowError, RowErrorKind};
use crate::model::shipment::ShipmentRecord;
use crate::schema::{Column, ColumnLayout, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;

/// Converts one CSV row into a `ShipmentRecord`.
///
/// `row` is only used in error messages. The row must be exactly
/// `layout.width()` fields wide; empty optional fields become `None` and flags
/// never fail.
pub fn parse_row(
    row: usize,
    fields: &[String],
    layout: &ColumnLayout,
) -> Result<ShipmentRecord, MalformedRowError> {
    if fields.len() != layout.width() {
        return Err(MalformedRowError {
            row,
            column: None,
            kind: RowErrorKind::ColumnCount {
                expected: layout.width(),
                found: fields.len(),
            },
        });
    }

    let cells = Cells {
        row,
        fields,
        layout,
    };

    Ok(ShipmentRecord {
        shipment_number: cells.key(Column::ShipmentNumber)?,
        air_waybill: cells.text(Column::AirWaybill),
        registration_date: cells.timestamp(Column::RegistrationDate)?,
        created_date: cells.timestamp(Column::CreatedDate)?,
        arrival_scan_time: cells.timestamp(Column::ArrivalScanTime)?,
        gateway_code: cells.text(Column::GatewayCode),
        shipper_name: cells.text(Column::ShipperName),
        last_signature: cells.text(Column::LastSignature),
        product_code: cells.text(Column::ProductCode),
        line_item_count: cells.integer(Column::LineItemCount)?,
        hold_code: cells.text(Column::HoldCode),
        hold_code_date: cells.timestamp(Column::HoldCodeDate)?,
        customs_status: cells.text(Column::CustomsStatus),
        customs_status_time: cells.timestamp(Column::CustomsStatusTime)?,
        control_check: cells.flag(Column::ControlCheck),
        control_date: cells.timestamp(Column::ControlDate)?,
        bpo_check: cells.flag(Column::BpoCheck),
        bpo_date: cells.timestamp(Column::BpoDate)?,
        error_check: cells.flag(Column::ErrorCheck),
        error_date: cells.timestamp(Column::ErrorDate)?,
        image: cells.text(Column::Image),
        image_date: cells.timestamp(Column::ImageDate)?,
    })
}

struct Cells<'a> {
    row: usize,
    fields: &'a [String],
    layout: &'a ColumnLayout,
}

impl Cells<'_> {
    fn get(&self, column: Column) -> &str {
        &self.fields[self.layout.position(column)]
    }

    fn fail(&self, column: Column, kind: RowErrorKind) -> MalformedRowError {
        MalformedRowError {
            row: self.row,
            column: Some(column.header()),
            kind,
        }
    }

    fn key(&self, column: Column) -> Result<i32, MalformedRowError> {
        let value = self.get(column);
        value.parse::<i32>().map_err(|e| {
            self.fail(
                column,
                RowErrorKind::InvalidInteger {
                    value: value.to_string(),
                    reason: e.to_string(),
                },
            )
        })
    }

    fn text(&self, column: Column) -> Option<String> {
        let value = self.get(column);
        (!value.is_empty()).then(|| value.to_string())
    }

    fn integer(&self, column: Column) -> Result<Option<i32>, MalformedRowError> {
        if self.get(column).is_empty() {
            return Ok(None);
        }
        self.key(column).map(Some)
    }

    fn timestamp(&self, column: Column) -> Result<Option<NaiveDateTime>, MalformedRowError> {
        let value = self.get(column);
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|e| {
                self.fail(
                    column,
                    RowErrorKind::InvalidTimestamp {
                        value: value.to_string(),
                        reason: e.to_string(),
                    },
                )
            })
    }

    fn flag(&self, column: Column) -> bool {
        self.get(column).eq_ignore_ascii_case("true")
    }
}
