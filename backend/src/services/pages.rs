use super::render_page;
use crate::views::{TemplateSet, ViewData};
use actix_web::http::StatusCode;
use actix_web::web::{get, resource};
use actix_web::{web, HttpResponse};
use common::schema::SHIPMENT_COLUMNS;

/// `/`, `/export` and `/help`. Export is not implemented; its page says so.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(resource("/").route(get().to(landing)))
        .service(resource("/export").route(get().to(export)))
        .service(resource("/help").route(get().to(help)));
}

async fn landing(templates: web::Data<TemplateSet>) -> HttpResponse {
    render_page(&templates, StatusCode::OK, "landing", &ViewData::new())
}

async fn export(templates: web::Data<TemplateSet>) -> HttpResponse {
    render_page(&templates, StatusCode::OK, "export", &ViewData::new())
}

async fn help(templates: web::Data<TemplateSet>) -> HttpResponse {
    let columns = SHIPMENT_COLUMNS
        .iter()
        .map(|c| c.header)
        .collect::<Vec<_>>()
        .join(", ");
    let data = ViewData::new()
        .with("columns", columns)
        .with("timestamp_format", "YYYY-MM-DD HH:MM");
    render_page(&templates, StatusCode::OK, "help", &data)
}
