//! Workers AI provider implementation.
//!
//! Calls the `ai/run/{model}` REST endpoint with a multipart body made of
//! `input_image_{n}` parts followed by the `prompt` field.

use super::{ImageProvider, ProviderError};
use crate::models::GenerationRequest;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

/// Workers AI provider configuration.
#[derive(Clone)]
pub struct WorkersAiConfig {
    pub base_url: String,
    pub account_id: String,
    pub api_token: Secret<String>,
    pub model: String,
    pub timeout: Option<Duration>,
}

/// Workers AI image provider.
pub struct WorkersAiProvider {
    config: WorkersAiConfig,
    client: Client,
}

impl WorkersAiProvider {
    pub fn new(config: WorkersAiConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Build the run URL for the configured model.
    fn run_url(&self) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_id,
            self.config.model
        )
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.config.account_id.is_empty() {
            return Err(ProviderError::NotConfigured(
                "inference account id is not set".to_string(),
            ));
        }
        if self.config.api_token.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "inference API token is not set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outbound multipart body: indexed reference images, then the prompt.
pub fn build_form(request: &GenerationRequest) -> Result<Form, ProviderError> {
    let mut form = Form::new();

    for (index, image) in request.reference_images().iter().enumerate() {
        let part = Part::bytes(image.data.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| {
                ProviderError::InvalidRequest(format!(
                    "reference image {} has an invalid content type: {}",
                    index, e
                ))
            })?;
        form = form.part(format!("input_image_{}", index), part);
    }

    Ok(form.text("prompt", request.prompt().to_string()))
}

/// JSON envelope the REST API wraps results and errors in.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<ApiResult>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

impl ApiEnvelope {
    fn error_message(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.trim())
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Extract image bytes from a successful JSON envelope.
fn image_from_envelope(body: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let envelope: ApiEnvelope = serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("malformed JSON body: {}", e)))?;

    if envelope.success == Some(false) {
        return Err(ProviderError::Upstream(envelope.error_message()));
    }

    let encoded = envelope
        .result
        .and_then(|r| r.image)
        .ok_or_else(|| ProviderError::InvalidResponse("response contains no image".to_string()))?;

    STANDARD
        .decode(encoded.trim())
        .map_err(|e| ProviderError::InvalidResponse(format!("image is not valid base64: {}", e)))
}

/// Best-effort error text from a non-2xx body.
fn error_text(body: &[u8]) -> String {
    match serde_json::from_slice::<ApiEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope.error_message();
            if message.is_empty() {
                String::from_utf8_lossy(body).trim().to_string()
            } else {
                message
            }
        }
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}

#[async_trait]
impl ImageProvider for WorkersAiProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, ProviderError> {
        self.ensure_configured()?;

        let form = build_form(request)?;

        tracing::debug!(
            model = %self.config.model,
            prompt_len = request.prompt().len(),
            image_count = request.reference_images().len(),
            "Sending request to Workers AI"
        );

        let response = self
            .client
            .post(self.run_url())
            .bearer_auth(self.config.api_token.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_text(&body),
            });
        }

        if is_json {
            image_from_envelope(&body)
        } else {
            Ok(body.to_vec())
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.ensure_configured()
    }
}
