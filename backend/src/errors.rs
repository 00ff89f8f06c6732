//! # Import Errors
//!
//! Every failure of `POST /import` and `POST /api/import` ends up as an
//! [`ImportError`], whatever stage raised it:
//!
//! - `Input`: the upload itself is unusable (wrong fields, empty file, bad
//!   extension, too large). Nothing has been parsed yet.
//! - `Parse`: the CSV could not be converted; identifies the row and column.
//! - `Persistence`: the database refused the batch; the transaction was
//!   rolled back.
//! - `Task`: the blocking conversion task panicked or was cancelled.
//!
//! None of them leave rows behind, and none are retried.

use crate::db::StoreError;
use crate::services::import::upload::UploadError;
use actix_web::http::StatusCode;
use common::error::ConvertError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Input(#[from] UploadError),

    #[error("could not read CSV: {0}")]
    Parse(#[from] ConvertError),

    #[error("could not store shipments: {0}")]
    Persistence(#[from] StoreError),

    #[error("import task failed: {0}")]
    Task(String),
}

impl ImportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ImportError::Input(_) | ImportError::Parse(_) => StatusCode::BAD_REQUEST,
            ImportError::Persistence(_) | ImportError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
