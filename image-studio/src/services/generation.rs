//! Generation proxy: forwards a validated request to the image provider and
//! turns the returned bytes into an embeddable data URI.

use crate::error::GenerationError;
use crate::models::{GeneratedImage, GenerationRequest};
use crate::services::providers::ImageProvider;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct GenerationService {
    provider: Arc<dyn ImageProvider>,
}

impl GenerationService {
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn ImageProvider> {
        &self.provider
    }

    /// Run one generation. No retry; the caller sees the first failure.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedImage, GenerationError> {
        let model = self.provider.model().to_string();
        let start = Instant::now();

        tracing::info!(
            model = %model,
            prompt_len = request.prompt().len(),
            image_count = request.reference_images().len(),
            "Generating image"
        );

        let outcome = self.provider.generate(request).await;
        histogram!("image_generation_duration_seconds", "model" => model.clone())
            .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(bytes) => {
                counter!("image_generations_total", "outcome" => "success").increment(1);
                tracing::info!(
                    model = %model,
                    bytes = bytes.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Image generated"
                );
                Ok(GeneratedImage::from_bytes(request.prompt(), &bytes))
            }
            Err(e) => {
                counter!("image_generations_total", "outcome" => "failure").increment(1);
                tracing::error!(model = %model, error = %e, "Generation error");
                Err(e.into())
            }
        }
    }
}
