use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bucketdrop_storage::StoreError;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::state::AppState;

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

pub const SUCCESS_BODY: &str = "File uploaded successfully!";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unable to parse form")]
    Form(String),

    #[error("Error retrieving the file")]
    MissingFile,

    #[error("Error creating temp file")]
    TempCreate(#[source] std::io::Error),

    #[error("Error saving file")]
    TempWrite(#[source] std::io::Error),

    #[error("Error uploading file: {0}")]
    Store(#[from] StoreError),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Form(_) | UploadError::MissingFile => StatusCode::BAD_REQUEST,
            UploadError::TempCreate(_) | UploadError::TempWrite(_) | UploadError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            UploadError::Form(detail) => {
                tracing::warn!(detail = %detail, "upload rejected: malformed form")
            }
            UploadError::MissingFile => tracing::warn!("upload rejected: missing file field"),
            UploadError::TempCreate(e) | UploadError::TempWrite(e) => {
                tracing::error!(error = %e, "{self}")
            }
            UploadError::Store(_) => {}
        }
        (status, self.to_string()).into_response()
    }
}

/// The file part copied to local disk. The backing file is removed when
/// this is dropped.
struct StagedUpload {
    file_name: String,
    file: File,
    size: u64,
    _temp: NamedTempFile,
}

async fn stage_field(
    field: &mut Field<'_>,
    file_name: String,
    staging_dir: &Path,
) -> Result<StagedUpload, UploadError> {
    let temp = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(staging_dir)
        .map_err(UploadError::TempCreate)?;
    let handle = temp.as_file().try_clone().map_err(UploadError::TempCreate)?;
    let mut file = File::from_std(handle);

    let mut size = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| UploadError::Form(e.body_text()))?
    {
        file.write_all(&chunk)
            .await
            .map_err(UploadError::TempWrite)?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(UploadError::TempWrite)?;

    Ok(StagedUpload {
        file_name,
        file,
        size,
        _temp: temp,
    })
}

/// ANY /upload  (multipart: file)
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<&'static str, UploadError> {
    let started = Instant::now();
    let mut multipart = multipart.map_err(|e| UploadError::Form(e.body_text()))?;

    // The whole body is read before anything is sent to the store, so a
    // truncated form never produces an object. The first file part wins.
    let mut staged: Option<StagedUpload> = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Form(e.body_text()))?
    {
        if staged.is_some() || field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        tracing::debug!(file = %file_name, "receiving file data");
        staged = Some(stage_field(&mut field, file_name, &state.staging_dir).await?);
    }

    let Some(mut staged) = staged else {
        return Err(UploadError::MissingFile);
    };

    staged
        .file
        .seek(SeekFrom::Start(0))
        .await
        .map_err(UploadError::TempWrite)?;

    let key = state.settings.object_key(&staged.file_name);
    tracing::info!(key = %key, size_bytes = staged.size, "storing object");

    let size = staged.size;
    state.store.put(&key, staged.file).await.map_err(|e| {
        tracing::error!(
            key = %key,
            store = state.store.name(),
            error = %e,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "put failed"
        );
        UploadError::Store(e)
    })?;

    tracing::info!(
        key = %key,
        size_bytes = size,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "upload complete"
    );
    Ok(SUCCESS_BODY)
}
