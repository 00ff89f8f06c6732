use super::pipeline::{import_from_request, ImportOptions};
use crate::db::ShipmentStore;
use crate::services::render_page;
use crate::views::{TemplateSet, ViewData};
use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};

/// Actix web handler for `GET /import`: the upload form.
pub async fn show(templates: web::Data<TemplateSet>) -> HttpResponse {
    render_page(&templates, StatusCode::OK, "import", &ViewData::new())
}

/// Actix web handler for `POST /import`, the form submission.
///
/// Runs the multipart payload through [`import_from_request`] and renders the
/// outcome as a page.
///
/// # Arguments
/// * `payload` - The multipart form carrying either `datafile` or `data`.
/// * `store` - The shipment store the batch is written to.
/// * `options` - CSV settings from the environment.
/// * `templates` - The page templates.
///
/// # Returns
/// - `200 OK` with the `success` page and the import summary.
/// - `400 Bad Request` with the `error` page when the upload is unusable or a
///   row does not parse.
/// - `500 Internal Server Error` with the `error` page when the store rejects
///   the batch.
pub async fn submit(
    payload: Multipart,
    store: web::Data<dyn ShipmentStore>,
    options: web::Data<ImportOptions>,
    templates: web::Data<TemplateSet>,
) -> HttpResponse {
    match import_from_request(store.get_ref(), payload, &options).await {
        Ok(summary) => {
            let data = ViewData::message("Data Imported Successfully!")
                .with("source", summary.source.to_string())
                .with("rows_upserted", summary.rows_upserted.to_string())
                .with(
                    "rows_stored",
                    summary
                        .rows_stored
                        .map_or_else(|| "unavailable".to_string(), |n| n.to_string()),
                )
                .with("md5", summary.md5)
                .with("import_id", summary.import_id);
            render_page(&templates, StatusCode::OK, "success", &data)
        }
        Err(e) => render_page(
            &templates,
            e.status_code(),
            "error",
            &ViewData::message(e.to_string()),
        ),
    }
}
