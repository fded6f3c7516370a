//! Image provider abstractions and implementations.
//!
//! The generation proxy talks to an [`ImageProvider`], so the hosted
//! inference API can be swapped for the in-process mock in tests and
//! local runs.

pub mod mock;
pub mod workers_ai;

use crate::models::GenerationRequest;
use async_trait::async_trait;
use thiserror::Error;

pub use mock::MockImageProvider;
pub use workers_ai::{WorkersAiConfig, WorkersAiProvider};

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Inference API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The provider reported failure without an HTTP error status.
    #[error("{0}")]
    Upstream(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited by inference provider")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// A hosted (or fake) text-to-image model.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Model identifier sent with every call.
    fn model(&self) -> &str;

    /// Run the model and return the raw image bytes.
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, ProviderError>;

    /// Readiness check; does not run the model.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
