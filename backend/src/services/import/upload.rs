use actix_multipart::Multipart;
use common::model::summary::ImportSource;
use futures_util::StreamExt;
use std::path::Path;
use thiserror::Error;

/// Cap on the bytes read from one multipart request, all fields together.
pub const MAX_UPLOAD_BYTES: usize = 10 << 20;

/// Multipart field carrying an uploaded CSV file.
pub const FILE_FIELD: &str = "datafile";
/// Multipart field carrying pasted CSV text.
pub const TEXT_FIELD: &str = "data";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UploadError {
    #[error("please provide either an uploaded file OR pasted data, not both")]
    Both,

    #[error("please provide either an uploaded file or pasted data")]
    Neither,

    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("invalid extension: expected .csv, got {0}")]
    BadExtension(String),

    #[error("upload exceeds the {} MB limit", MAX_UPLOAD_BYTES >> 20)]
    TooLarge,

    #[error("field '{0}' was sent more than once")]
    Repeated(&'static str),

    #[error("error parsing multipart form: {0}")]
    Multipart(String),
}

/// The one CSV payload a request is allowed to carry.
#[derive(Debug, PartialEq, Eq)]
pub struct CsvUpload {
    pub source: ImportSource,
    pub bytes: Vec<u8>,
}

/// The `datafile` and `data` parts of one request, each at most once.
#[derive(Debug, Default)]
struct FormFields {
    file: Option<(String, Vec<u8>)>,
    text: Option<Vec<u8>>,
}

impl FormFields {
    /// Keeps a known field and drops any other. A second `datafile` or
    /// `data` part is an error instead of replacing the first.
    fn accept(
        &mut self,
        name: Option<&str>,
        filename: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<(), UploadError> {
        match name {
            Some(FILE_FIELD) => {
                if self.file.is_some() {
                    return Err(UploadError::Repeated(FILE_FIELD));
                }
                self.file = Some((filename.unwrap_or_default(), bytes));
            }
            Some(TEXT_FIELD) => {
                if self.text.is_some() {
                    return Err(UploadError::Repeated(TEXT_FIELD));
                }
                self.text = Some(bytes);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Drains the multipart stream, keeping the `datafile` and `data` fields and
/// discarding any other field.
pub async fn read_upload(mut payload: Multipart) -> Result<CsvUpload, UploadError> {
    let mut fields = FormFields::default();
    let mut received = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| UploadError::Multipart(e.to_string()))?;
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(|n| n.to_string()),
                cd.get_filename().map(|f| f.to_string()),
            ),
            None => (None, None),
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
            received += chunk.len();
            if received > MAX_UPLOAD_BYTES {
                return Err(UploadError::TooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }

        fields.accept(name.as_deref(), filename, bytes)?;
    }

    select_source(fields.file, fields.text)
}

/// Enforces "exactly one source", then validates a file source.
///
/// A file part without a name and without content is what browsers send for
/// an untouched file input, so it counts as absent, as does whitespace-only
/// pasted text.
pub fn select_source(
    file: Option<(String, Vec<u8>)>,
    text: Option<Vec<u8>>,
) -> Result<CsvUpload, UploadError> {
    let file = file.filter(|(name, bytes)| !(name.is_empty() && bytes.is_empty()));
    let text = text.filter(|t| t.iter().any(|b| !b.is_ascii_whitespace()));

    match (file, text) {
        (Some(_), Some(_)) => Err(UploadError::Both),
        (None, None) => Err(UploadError::Neither),
        (None, Some(bytes)) => Ok(CsvUpload {
            source: ImportSource::Pasted,
            bytes,
        }),
        (Some((name, bytes)), None) => {
            validate_file(&name, &bytes)?;
            Ok(CsvUpload {
                source: ImportSource::File { name },
                bytes,
            })
        }
    }
}

fn validate_file(name: &str, bytes: &[u8]) -> Result<(), UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::EmptyFile);
    }
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(()),
        Some(ext) => Err(UploadError::BadExtension(format!(".{}", ext))),
        None => Err(UploadError::BadExtension("no extension".to_string())),
    }
}
