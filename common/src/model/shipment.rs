use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the `export_shipments` table.
///
/// Built from a single CSV row during an import request and dropped once the
/// batch is written. `shipment_number` is the primary key; a later import of
/// the same number replaces every other field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub shipment_number: i32,
    pub air_waybill: Option<String>,
    pub registration_date: Option<NaiveDateTime>,
    pub created_date: Option<NaiveDateTime>,
    pub arrival_scan_time: Option<NaiveDateTime>,
    pub gateway_code: Option<String>,
    pub shipper_name: Option<String>,
    pub last_signature: Option<String>,
    pub product_code: Option<String>,
    pub line_item_count: Option<i32>,
    pub hold_code: Option<String>,
    pub hold_code_date: Option<NaiveDateTime>,
    pub customs_status: Option<String>,
    pub customs_status_time: Option<NaiveDateTime>,
    pub control_check: bool,
    pub control_date: Option<NaiveDateTime>,
    pub bpo_check: bool,
    pub bpo_date: Option<NaiveDateTime>,
    pub error_check: bool,
    pub error_date: Option<NaiveDateTime>,
    pub image: Option<String>,
    pub image_date: Option<NaiveDateTime>,
}

impl ShipmentRecord {
    /// A record carrying only its key; every optional column empty and every
    /// flag cleared.
    pub fn empty(shipment_number: i32) -> Self {
        Self {
            shipment_number,
            air_waybill: None,
            registration_date: None,
            created_date: None,
            arrival_scan_time: None,
            gateway_code: None,
            shipper_name: None,
            last_signature: None,
            product_code: None,
            line_item_count: None,
            hold_code: None,
            hold_code_date: None,
            customs_status: None,
            customs_status_time: None,
            control_check: false,
            control_date: None,
            bpo_check: false,
            bpo_date: None,
            error_check: false,
            error_date: None,
            image: None,
            image_date: None,
        }
    }
}
