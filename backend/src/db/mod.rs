//! # Shipment Storage
//!
//! The Upsert Executor. [`ShipmentStore`] hides which database holds the
//! `export_shipments` table:
//!
//! - [`postgres::PostgresStore`]: the production store, an sqlx pool.
//! - [`sqlite::SqliteStore`]: a rusqlite connection for local runs
//!   (`DB_DRIVER=sqlite`) and for the test suite.
//!
//! Both write a batch inside one transaction with one prepared
//! `INSERT .. ON CONFLICT (SpedNr) DO UPDATE` statement, so an import either
//! lands completely or not at all.

pub mod postgres;
pub mod sqlite;

use crate::config::DatabaseSettings;
use async_trait::async_trait;
use common::model::shipment::ShipmentRecord;
use common::schema::SHIPMENT_COLUMNS;
use std::sync::Arc;
use thiserror::Error;

pub const TABLE: &str = "export_shipments";

pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS export_shipments (
    SpedNr INTEGER PRIMARY KEY,
    AWB VARCHAR(20),
    RegDate TIMESTAMP,
    CreatedDate TIMESTAMP,
    ArrivalScan TIMESTAMP,
    GTW VARCHAR(10),
    ShipperName VARCHAR(255),
    LastSign VARCHAR(50),
    ProductCode VARCHAR(10),
    LineItems INTEGER,
    HoldCode VARCHAR(50),
    HoldCodeDate TIMESTAMP,
    TullStatus VARCHAR(10),
    TullStatusDT TIMESTAMP,
    ControllCheck BOOLEAN,
    ControllDate TIMESTAMP,
    BPOCheck BOOLEAN,
    BPODate TIMESTAMP,
    ErrorCheck BOOLEAN,
    ErrorDate TIMESTAMP,
    Image VARCHAR(255),
    ImageDate TIMESTAMP
)";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("postgres: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Statement failure for one record; the transaction was rolled back.
    #[error("row {row} (SpedNr {shipment_number}) rejected: {message}")]
    Row {
        row: usize,
        shipment_number: i32,
        message: String,
    },

    #[error("storage task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Creates the table if it does not exist yet.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Upserts every record in one transaction and returns how many were
    /// written. Any failure rolls back the whole batch.
    async fn upsert_batch(&self, records: &[ShipmentRecord]) -> Result<usize, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    async fn fetch(&self, shipment_number: i32) -> Result<Option<ShipmentRecord>, StoreError>;
}

/// Opens the configured store and makes sure the table exists.
pub async fn connect(settings: &DatabaseSettings) -> Result<Arc<dyn ShipmentStore>, StoreError> {
    let store: Arc<dyn ShipmentStore> = match settings {
        DatabaseSettings::Postgres(pg) => Arc::new(postgres::PostgresStore::connect(pg).await?),
        DatabaseSettings::Sqlite { path } => Arc::new(sqlite::SqliteStore::open(path)?),
    };
    store.ensure_schema().await?;
    Ok(store)
}

fn column_list() -> String {
    SHIPMENT_COLUMNS
        .iter()
        .map(|c| c.header)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT .. ON CONFLICT` over every column; `placeholder(n)` renders the
/// n-th (1-based) bind parameter in the driver's syntax.
pub(crate) fn upsert_sql(placeholder: impl Fn(usize) -> String) -> String {
    let values = (1..=SHIPMENT_COLUMNS.len())
        .map(placeholder)
        .collect::<Vec<_>>()
        .join(", ");
    let key = SHIPMENT_COLUMNS[0].header;
    let updates = SHIPMENT_COLUMNS[1..]
        .iter()
        .map(|c| format!("{0} = EXCLUDED.{0}", c.header))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {TABLE} ({}) VALUES ({values}) ON CONFLICT ({key}) DO UPDATE SET {updates}",
        column_list()
    )
}

/// Full-row lookup by key, columns in table order.
pub(crate) fn select_sql(placeholder: &str) -> String {
    format!(
        "SELECT {} FROM {TABLE} WHERE {} = {placeholder}",
        column_list(),
        SHIPMENT_COLUMNS[0].header
    )
}
