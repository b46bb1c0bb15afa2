//! Application startup and lifecycle management.

use crate::config::{AiConfig, ImagegenConfig};
use crate::handlers;
use crate::services::metrics;
use crate::services::{ChatCompletionsProvider, ImageProvider};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ImagegenConfig,
    /// `None` when the upstream base URL or API key is missing.
    pub provider: Option<Arc<dyn ImageProvider>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/api/generate", post(handlers::generate_image))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Build the upstream provider, or `None` when credentials are incomplete.
fn build_provider(ai: &AiConfig) -> Result<Option<Arc<dyn ImageProvider>>, AppError> {
    let Some((base_url, api_key)) = ai.credentials() else {
        tracing::warn!(
            "AI_BASE_URL or AI_API_KEY not configured; generate requests will be rejected"
        );
        return Ok(None);
    };

    let provider = ChatCompletionsProvider::new(base_url, api_key.clone())
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

    tracing::info!(
        endpoint = %provider.endpoint(),
        model = %ai.model,
        "Initialized image provider"
    );

    Ok(Some(Arc::new(provider)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ImagegenConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config.ai)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: ImagegenConfig,
        provider: Option<Arc<dyn ImageProvider>>,
    ) -> Result<Self, AppError> {
        metrics::init_metrics();

        let port = config.common.port;
        let app = router(AppState { config, provider });

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Image generation service listening on port {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::pin(async move { server.await }),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
