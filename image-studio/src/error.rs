//! User-facing errors of the generation flow.

use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Returned with 400 when the prompt is missing or empty.
pub const MISSING_PROMPT_MESSAGE: &str = "Please enter an image description";

/// Returned with 500 when a generation failure has no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Image generation failed, please try again";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{}", MISSING_PROMPT_MESSAGE)]
    MissingPrompt,

    #[error("Invalid form submission: {0}")]
    InvalidForm(String),

    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl GenerationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerationError::MissingPrompt | GenerationError::InvalidForm(_) => {
                StatusCode::BAD_REQUEST
            }
            GenerationError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GenerationError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user; falls back to a generic text when empty.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.user_message() }))).into_response()
    }
}
