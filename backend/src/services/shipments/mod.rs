//! Read access to stored shipments, for checking what an import wrote.

mod get;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/shipments";

/// `GET /api/shipments/{shipment_number}`: the stored record as JSON.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/{shipment_number}", get().to(get::process))
}
