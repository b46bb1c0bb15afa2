use crate::dtos::{GenerateResponse, GenerationRequest};
use crate::error::GenerateError;
use crate::models::{extract_image_url, normalize_image_url, UpstreamPayload};
use crate::services::metrics;
use crate::services::providers::UpstreamBody;
use crate::startup::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    Json,
};
use std::time::Instant;

/// `POST /api/generate`: one form in, one upstream call, one image URL out.
///
/// The configuration check runs before the body is read so an unconfigured
/// service always answers 500 without touching the network.
pub async fn generate_image(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<GenerateResponse>), GenerateError> {
    let result = generate(&state, request).await;

    metrics::record_request(match &result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    });

    result
}

async fn generate(
    state: &AppState,
    request: Request,
) -> Result<(StatusCode, Json<GenerateResponse>), GenerateError> {
    let provider = state.provider.as_ref().ok_or_else(|| {
        tracing::error!("Generate request rejected: AI_BASE_URL or AI_API_KEY not configured");
        GenerateError::NotConfigured
    })?;

    let form = GenerationRequest::from_request(request).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read generate form");
        GenerateError::Transport
    })?;

    let payload = UpstreamPayload::new(&state.config.ai.model, &form);

    let started = Instant::now();
    let reply = provider.generate(&payload).await;
    metrics::observe_upstream_latency(started.elapsed().as_secs_f64());

    let reply = reply.map_err(|e| {
        tracing::error!(error = %e, "Image provider request failed");
        GenerateError::Transport
    })?;
    metrics::record_upstream_status(reply.status.as_u16());

    let body = match reply.body {
        UpstreamBody::Json(body) => body,
        UpstreamBody::Text(raw) => {
            tracing::error!(
                status = %reply.status,
                raw = %raw,
                "Image provider returned non-JSON response"
            );
            return Err(GenerateError::UpstreamFormat { raw });
        }
    };

    let image_url = match extract_image_url(&body) {
        Ok(url) => url,
        Err(reason) => {
            tracing::warn!(
                status = %reply.status,
                reason = %reason,
                "No image in image provider response"
            );
            return Err(GenerateError::UpstreamContent { raw: body });
        }
    };

    tracing::info!(
        model = %payload.model,
        status = %reply.status,
        "Image generated"
    );

    Ok((
        reply.status,
        Json(GenerateResponse {
            image_url: normalize_image_url(image_url),
        }),
    ))
}
