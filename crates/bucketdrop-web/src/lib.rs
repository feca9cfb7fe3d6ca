mod routes;
mod state;

use std::future::Future;
use std::io::ErrorKind;
use std::sync::Arc;

use bucketdrop_core::config::Settings;
use bucketdrop_storage::ObjectStore;
use tokio::net::TcpListener;

pub use routes::build_router;
pub use routes::list::{ListError, render_listing};
pub use routes::upload::{FILE_FIELD, SUCCESS_BODY, UploadError};
pub use state::AppState;

/// Dual-stack listener, or IPv4 only when the host has no IPv6.
async fn bind(settings: &Settings) -> anyhow::Result<TcpListener> {
    let addr = settings.listen_addr()?;
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == ErrorKind::AddrInUse => Err(e.into()),
        Err(e) => {
            let v4 = settings.listen_addr_v4()?;
            tracing::warn!(%addr, error = %e, "IPv6 bind failed, falling back to {v4}");
            Ok(TcpListener::bind(v4).await?)
        }
    }
}

/// Bind the configured port on all interfaces and serve until `shutdown`
/// resolves. In-flight requests are allowed to finish.
pub async fn start_server<F>(
    settings: Settings,
    store: Arc<dyn ObjectStore>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(&settings).await?;
    let addr = listener.local_addr()?;
    let port = settings.port.clone();
    let state = Arc::new(AppState::new(settings, store));
    let app = build_router(state);

    tracing::info!(%addr, "Server is running on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
