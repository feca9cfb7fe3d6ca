use std::path::PathBuf;
use std::sync::Arc;

use bucketdrop_core::config::Settings;
use bucketdrop_storage::ObjectStore;

/// Shared by every request handler. Read-only after startup.
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub settings: Settings,
    /// Where uploads are staged before being sent to the store.
    pub staging_dir: PathBuf,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            settings,
            staging_dir: std::env::temp_dir(),
        }
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }
}
