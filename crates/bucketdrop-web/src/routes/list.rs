use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bucketdrop_storage::StoreError;
use thiserror::Error;

use crate::state::AppState;

#[derive(Debug, Error)]
#[error("Error listing files: {0}")]
pub struct ListError(#[from] StoreError);

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Plain-text listing: keys separated by single spaces inside brackets.
pub fn render_listing(keys: &[String]) -> String {
    format!("Files in S3: [{}]", keys.join(" "))
}

/// ANY /list
pub async fn list_files(State(state): State<Arc<AppState>>) -> Result<String, ListError> {
    let prefix = &state.settings.key_prefix;
    let keys = state.store.list(prefix).await.map_err(|e| {
        tracing::error!(prefix = %prefix, store = state.store.name(), error = %e, "list failed");
        ListError(e)
    })?;

    tracing::info!(prefix = %prefix, count = keys.len(), "list OK");
    Ok(render_listing(&keys))
}
