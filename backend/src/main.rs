mod config;
mod db;
mod errors;
mod services;
mod views;

use crate::config::Settings;
use crate::db::ShipmentStore;
use crate::services::import::pipeline::ImportOptions;
use crate::views::TemplateSet;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::from_env().context("loading configuration")?;
    let templates = TemplateSet::embedded().context("loading page templates")?;
    let store = db::connect(&settings.database)
        .await
        .context("opening shipment store")?;
    info!("{} store ready, export_shipments table present", store.name());

    let templates = web::Data::new(templates);
    let store: web::Data<dyn ShipmentStore> = web::Data::from(store);
    let options = web::Data::new(ImportOptions {
        delimiter: settings.csv_delimiter,
    });

    let host = settings.http.host.clone();
    let port = settings.http.port;
    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(templates.clone())
            .app_data(store.clone())
            .app_data(options.clone())
            .configure(services::configure)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("binding {}:{}", host, port))?
    .run()
    .await?;

    Ok(())
}
