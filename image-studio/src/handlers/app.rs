use crate::models::{GeneratedImage, GenerationResult, MAX_REFERENCE_IMAGES};
use crate::AppState;
use askama::Template;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub model: String,
    pub max_images: usize,
    pub prompt: String,
    pub result: Option<GenerationResult>,
}

impl IndexTemplate {
    pub fn new(model: impl Into<String>, result: Option<GenerationResult>) -> Self {
        Self {
            model: model.into(),
            max_images: MAX_REFERENCE_IMAGES,
            prompt: String::new(),
            result,
        }
    }

    /// Prefill the prompt textarea.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        match &self.result {
            Some(GenerationResult::Success(image)) => Some(image),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.result {
            Some(GenerationResult::Failure { message, .. }) => Some(message),
            _ => None,
        }
    }
}

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate::new(state.generation.provider().model(), None)
}

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "image-studio",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the provider must be configured.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state
        .generation
        .provider()
        .health_check()
        .await
        .map(|_| StatusCode::OK)
        .map_err(|e| {
            tracing::warn!(error = %e, "Image provider not ready");
            AppError::ServiceUnavailable
        })
}
