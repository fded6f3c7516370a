//! Mock provider implementation for tests and local runs.

use super::{ImageProvider, ProviderError};
use crate::models::GenerationRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// 1x1 placeholder PNG.
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Only the most recent calls are kept, so a long-running mock server
/// does not accumulate every prompt it has seen.
pub const MAX_RECORDED_CALLS: usize = 32;

#[derive(Debug, Clone)]
enum Outcome {
    Image(Vec<u8>),
    Fail(String),
}

/// What the mock was asked to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub image_names: Vec<String>,
    pub image_sizes: Vec<usize>,
}

/// Mock image provider.
pub struct MockImageProvider {
    model: String,
    outcome: Outcome,
    calls: Mutex<VecDeque<RecordedCall>>,
}

impl MockImageProvider {
    /// Always returns `bytes` as the generated image.
    pub fn returning(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_outcome(Outcome::Image(bytes.into()))
    }

    /// Always fails with `message` (an empty message is allowed).
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Fail(message.into()))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            model: "mock/image".to_string(),
            outcome,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// Recorded calls, oldest first.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.iter().cloned().collect()
    }
}

impl Default for MockImageProvider {
    fn default() -> Self {
        Self::returning(PLACEHOLDER_PNG)
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, ProviderError> {
        let images = request.reference_images();
        let mut calls = self.calls.lock().await;
        if calls.len() == MAX_RECORDED_CALLS {
            calls.pop_front();
        }
        calls.push_back(RecordedCall {
            prompt: request.prompt().to_string(),
            image_names: images.iter().map(|i| i.file_name.clone()).collect(),
            image_sizes: images.iter().map(|i| i.data.len()).collect(),
        });
        drop(calls);

        match &self.outcome {
            Outcome::Image(bytes) => Ok(bytes.clone()),
            Outcome::Fail(message) => Err(ProviderError::Upstream(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
