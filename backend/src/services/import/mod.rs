//! # CSV Import
//!
//! The Upload Handler and the routes that drive it:
//!
//! - `GET /import`: the upload form.
//! - `POST /import`: multipart upload from the form. Renders the `success`
//!   page with an [`ImportSummary`], or the `error` page with the message.
//! - `POST /api/import`: the same pipeline for scripts; answers with the
//!   summary as JSON or `{"error": ...}`.
//!
//! A request carries its CSV either as the `datafile` file field or as the
//! `data` text field, never both. The payload is validated
//! (`upload`), converted in full (`common::parse`), and only then written in
//! one transaction (`pipeline`). A failure at any stage leaves the table as
//! it was.
//!
//! [`ImportSummary`]: common::model::summary::ImportSummary

mod api;
mod form;
pub mod pipeline;
pub mod upload;

use actix_web::web::{get, post, resource};
use actix_web::Resource;

const FORM_PATH: &str = "/import";
const API_PATH: &str = "/api/import";

pub fn configure_routes() -> Resource {
    resource(FORM_PATH)
        .route(get().to(form::show))
        .route(post().to(form::submit))
}

pub fn configure_api_routes() -> Resource {
    resource(API_PATH).route(post().to(api::process))
}
