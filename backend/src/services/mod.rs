//! HTTP routes. Each sub-module owns its paths and hands them to
//! [`configure`], which `main.rs` and the tests apply to an `App` that already
//! carries the shared state:
//!
//! - `web::Data<dyn ShipmentStore>`: the storage backend.
//! - `web::Data<TemplateSet>`: the page templates.
//! - `web::Data<ImportOptions>`: CSV settings.

mod assets;
pub mod import;
mod pages;
mod shipments;

#[cfg(test)]
mod tests;

use crate::views::{TemplateSet, ViewData};
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use log::error;

pub fn configure(cfg: &mut web::ServiceConfig) {
    pages::configure_routes(cfg);
    cfg.service(import::configure_routes())
        .service(import::configure_api_routes())
        .service(shipments::configure_routes())
        .service(assets::configure_routes())
        .default_service(web::route().to(assets::not_found));
}

/// Renders `name` with `status`; a render failure becomes a plain 500.
pub fn render_page(
    templates: &TemplateSet,
    status: StatusCode,
    name: &str,
    data: &ViewData,
) -> HttpResponse {
    match templates.render(name, data) {
        Ok(html) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(html),
        Err(e) => {
            error!("rendering {} page: {}", name, e);
            HttpResponse::InternalServerError().body("Internal Server Error")
        }
    }
}
