use async_trait::async_trait;
use tokio::fs::File;

use crate::error::StoreError;

/// Remote object storage as seen by the request handlers.
///
/// One instance is built at startup and shared by every in-flight request,
/// so implementations must not keep per-request state.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` as the full content of `key`, replacing any existing
    /// object. `body` is read from its current position to the end.
    async fn put(&self, key: &str, body: File) -> Result<(), StoreError>;

    /// Keys beginning with `prefix`. Only the first page the backend
    /// returns; no continuation.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Check that credentials resolve and the backend is reachable.
    async fn test_connection(&self) -> Result<(), StoreError>;

    /// Backend name for display.
    fn name(&self) -> &str;
}
