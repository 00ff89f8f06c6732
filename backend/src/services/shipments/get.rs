//! # Shipment Lookup
//!
//! Backs `GET /api/shipments/{shipment_number}`, used to check what an import
//! stored.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` takes the shipment number from the path and
//!     parses it as the table's integer key.
//! 2.  **Store Query**: the number is looked up through the injected
//!     `ShipmentStore`, whichever database backs it.
//! 3.  **HTTP Response**: the stored row is returned as a JSON
//!     `ShipmentRecord`; absent columns are `null`.

use crate::db::ShipmentStore;
use actix_web::{web, HttpResponse};
use log::error;
use serde_json::json;

/// Actix web handler for the `GET /api/shipments/{shipment_number}` endpoint.
///
/// # Arguments
/// * `shipment_number` - The `SpedNr` to look up, extracted from the URL path.
/// * `store` - The shipment store.
///
/// # Returns
/// - `200 OK` with the `ShipmentRecord`.
/// - `400 Bad Request` when the path segment is not an integer.
/// - `404 Not Found` when no row has that shipment number.
/// - `503 Service Unavailable` when the store fails.
pub async fn process(
    shipment_number: web::Path<String>,
    store: web::Data<dyn ShipmentStore>,
) -> HttpResponse {
    let raw = shipment_number.into_inner();
    let Ok(number) = raw.parse::<i32>() else {
        return HttpResponse::BadRequest()
            .json(json!({ "error": format!("invalid shipment number {:?}", raw) }));
    };

    match store.fetch(number).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound()
            .json(json!({ "error": format!("shipment {} not found", number) })),
        Err(e) => {
            error!("fetching shipment {}: {}", number, e);
            HttpResponse::ServiceUnavailable()
                .json(json!({ "error": format!("error retrieving shipment: {}", e) }))
        }
    }
}
