use axum::http::StatusCode;

/// ANY /healthz
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
