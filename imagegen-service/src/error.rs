use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failures of a single generate request. Each is reported to the caller as
/// `{"error": ..., "raw"?: ...}` and never affects other requests.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("AI_BASE_URL or AI_API_KEY not configured")]
    NotConfigured,

    #[error("Upstream returned non-JSON")]
    UpstreamFormat { raw: String },

    #[error("No image returned from AI backend")]
    UpstreamContent { raw: Value },

    #[error("Upstream request failed")]
    Transport,
}

impl GenerateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerateError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            GenerateError::UpstreamFormat { .. }
            | GenerateError::UpstreamContent { .. }
            | GenerateError::Transport => StatusCode::BAD_GATEWAY,
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            GenerateError::NotConfigured => "not_configured",
            GenerateError::UpstreamFormat { .. } => "upstream_format",
            GenerateError::UpstreamContent { .. } => "upstream_content",
            GenerateError::Transport => "transport",
        }
    }
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            raw: Option<Value>,
        }

        let status = self.status();
        let error = self.to_string();
        let raw = match self {
            GenerateError::UpstreamFormat { raw } => Some(Value::String(raw)),
            GenerateError::UpstreamContent { raw } => Some(raw),
            GenerateError::NotConfigured | GenerateError::Transport => None,
        };

        (status, Json(ErrorResponse { error, raw })).into_response()
    }
}
