//! Application startup and lifecycle management.

use crate::config::{ProviderKind, Settings};
use crate::handlers::{
    app::{health_check, index, readiness_check},
    generate::{generate_api, generate_page},
    metrics::metrics,
};
use crate::services::providers::{
    ImageProvider, MockImageProvider, WorkersAiConfig, WorkersAiProvider,
};
use crate::services::GenerationService;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Build the image provider selected in configuration.
pub fn build_provider(settings: &Settings) -> Result<Arc<dyn ImageProvider>, AppError> {
    let inference = &settings.inference;
    match inference.provider {
        ProviderKind::WorkersAi => {
            let provider = WorkersAiProvider::new(WorkersAiConfig {
                base_url: inference.base_url.clone(),
                account_id: inference.account_id.clone(),
                api_token: inference.api_token.clone(),
                model: inference.model.clone(),
                timeout: inference.timeout(),
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock image provider; generated images are placeholders");
            Ok(Arc::new(MockImageProvider::default()))
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(index).post(generate_page))
        .route("/api/generate", post(generate_api))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .layer(body_limit)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the trace span sees the generated request id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
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

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the provider named in `settings`.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let provider = build_provider(&settings)?;
        Self::build_with_provider(settings, provider).await
    }

    /// Build the application around an explicit provider.
    pub async fn build_with_provider(
        settings: Settings,
        provider: Arc<dyn ImageProvider>,
    ) -> Result<Self, AppError> {
        tracing::info!(model = %provider.model(), "Initialized image provider");

        let state = AppState::new(
            GenerationService::new(provider),
            settings.server.max_upload_bytes,
        );
        let router = build_router(state);

        // Port 0 = random port for testing
        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("image-studio listening on {}:{}", settings.server.host, port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C / SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
