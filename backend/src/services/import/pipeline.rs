use super::upload::{read_upload, CsvUpload};
use crate::db::ShipmentStore;
use crate::errors::ImportError;
use actix_multipart::Multipart;
use common::model::summary::ImportSummary;
use common::parse::{convert_document, Delimiter};
use log::{error, info, warn};
use std::time::Instant;
use uuid::Uuid;

/// Import settings shared by every request, built from `Settings` at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub delimiter: Delimiter,
}

/// Reads the request payload and runs it through the import pipeline,
/// logging the outcome.
pub async fn import_from_request(
    store: &dyn ShipmentStore,
    payload: Multipart,
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError> {
    let result = match read_upload(payload).await {
        Ok(upload) => run_import(store, upload, options).await,
        Err(e) => Err(e.into()),
    };

    match &result {
        Ok(summary) => info!(
            "import {} from {}: {} rows upserted, {} stored, {} ms",
            summary.import_id,
            summary.source,
            summary.rows_upserted,
            summary
                .rows_stored
                .map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            summary.elapsed_ms
        ),
        Err(e @ (ImportError::Persistence(_) | ImportError::Task(_))) => {
            error!("import failed: {}", e)
        }
        Err(e) => warn!("import rejected: {}", e),
    }
    result
}

/// Converts the whole upload first and only then touches the database, so a
/// malformed row never opens a transaction.
///
/// # Workflow
/// 1. Hash the payload and assign an import id.
/// 2. Convert the CSV on the blocking pool (rayon fans the rows out there).
/// 3. Upsert the batch in one transaction.
/// 4. Count the table. The batch is committed by now, so a failing count is
///    logged and reported as an unknown total rather than as a failed import.
pub async fn run_import(
    store: &dyn ShipmentStore,
    upload: CsvUpload,
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError> {
    let started = Instant::now();
    let import_id = Uuid::new_v4().to_string();
    let md5 = format!("{:x}", md5::compute(&upload.bytes));

    let CsvUpload { source, bytes } = upload;
    let delimiter = options.delimiter;
    let records = tokio::task::spawn_blocking(move || convert_document(&bytes, delimiter))
        .await
        .map_err(|e| ImportError::Task(e.to_string()))??;

    let rows_upserted = store.upsert_batch(&records).await?;
    let rows_stored = match store.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(
                "import {}: {} rows committed, counting the table failed: {}",
                import_id, rows_upserted, e
            );
            None
        }
    };

    Ok(ImportSummary {
        import_id,
        source,
        rows_upserted,
        rows_stored,
        md5,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}
