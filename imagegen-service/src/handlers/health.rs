use crate::services::metrics::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Stays 200 when the upstream is unconfigured.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "imagegen-service",
        "version": env!("CARGO_PKG_VERSION"),
        "upstreamConfigured": state.provider.is_some()
    }))
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        get_metrics(),
    )
}
