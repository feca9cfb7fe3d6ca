pub mod health;
pub mod list;
pub mod upload;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;

/// Every route accepts any method; handlers never look at it.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", any(health::healthz))
        // The file part is streamed to disk, so no body cap here.
        .route(
            "/upload",
            any(upload::upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/list", any(list::list_files))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
