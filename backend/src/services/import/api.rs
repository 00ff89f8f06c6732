use super::pipeline::{import_from_request, ImportOptions};
use crate::db::ShipmentStore;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// Actix web handler for the `POST /api/import` endpoint.
///
/// Same pipeline as the form, answering with JSON for scripted uploads.
///
/// # Arguments
/// * `payload` - The multipart form carrying either `datafile` or `data`.
/// * `store` - The shipment store the batch is written to.
/// * `options` - CSV settings from the environment.
///
/// # Returns
/// - `200 OK` with the `ImportSummary` as a JSON payload.
/// - `400 Bad Request` with `{"error": message}` for an unusable upload or a
///   malformed row.
/// - `500 Internal Server Error` with `{"error": message}` when storing fails.
pub async fn process(
    payload: Multipart,
    store: web::Data<dyn ShipmentStore>,
    options: web::Data<ImportOptions>,
) -> HttpResponse {
    match import_from_request(store.get_ref(), payload, &options).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => HttpResponse::build(e.status_code()).json(json!({ "error": e.to_string() })),
    }
}
