use super::render_page;
use crate::views::{TemplateSet, ViewData};
use actix_web::http::StatusCode;
use actix_web::web::{get, scope};
use actix_web::{web, HttpRequest, HttpResponse, Scope};
use include_dir::{include_dir, Dir};
use log::debug;
use mime_guess::from_path;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/static");

/// `GET /static/{file}` from the files embedded at build time.
pub fn configure_routes() -> Scope {
    scope("/static").route("/{file:.*}", get().to(serve_embedded))
}

async fn serve_embedded(
    file: web::Path<String>,
    req: HttpRequest,
    templates: web::Data<TemplateSet>,
) -> HttpResponse {
    let file_path = file.into_inner();
    match STATIC_DIR.get_file(&file_path) {
        Some(file) => {
            let mime = from_path(&file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => not_found(req, templates).await,
    }
}

pub async fn not_found(req: HttpRequest, templates: web::Data<TemplateSet>) -> HttpResponse {
    debug!("no route for {} {}", req.method(), req.path());
    render_page(
        &templates,
        StatusCode::NOT_FOUND,
        "not_found",
        &ViewData::new().with("path", req.path()),
    )
}
