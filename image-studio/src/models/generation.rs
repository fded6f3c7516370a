use crate::error::GenerationError;
use axum::body::Bytes;
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

/// Reference images beyond this count are never forwarded.
pub const MAX_REFERENCE_IMAGES: usize = 4;

/// Media type advertised in the returned data URI.
pub const GENERATED_IMAGE_MIME: &str = "image/png";

/// An uploaded image used to guide style or composition.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ReferenceImage {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A validated submission: non-empty prompt, at most four non-empty images.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prompt: String,
    reference_images: Vec<ReferenceImage>,
}

impl GenerationRequest {
    /// Empty image parts are dropped and the rest truncated to
    /// [`MAX_REFERENCE_IMAGES`], preserving submission order.
    pub fn new(
        prompt: impl Into<String>,
        images: impl IntoIterator<Item = ReferenceImage>,
    ) -> Result<Self, GenerationError> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(GenerationError::MissingPrompt);
        }

        let reference_images = images
            .into_iter()
            .filter(|image| !image.is_empty())
            .take(MAX_REFERENCE_IMAGES)
            .collect();

        Ok(Self {
            prompt,
            reference_images,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn reference_images(&self) -> &[ReferenceImage] {
        &self.reference_images
    }
}

/// Generated image ready to embed in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub prompt: String,
    pub data_uri: String,
}

impl GeneratedImage {
    pub fn from_bytes(prompt: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            prompt: prompt.into(),
            data_uri: format!("data:{};base64,{}", GENERATED_IMAGE_MIME, STANDARD.encode(bytes)),
        }
    }
}

/// Outcome of one submission, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success(GeneratedImage),
    Failure { status: StatusCode, message: String },
}

impl GenerationResult {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerationResult::Success(_) => StatusCode::OK,
            GenerationResult::Failure { status, .. } => *status,
        }
    }
}

impl From<Result<GeneratedImage, GenerationError>> for GenerationResult {
    fn from(result: Result<GeneratedImage, GenerationError>) -> Self {
        match result {
            Ok(image) => GenerationResult::Success(image),
            Err(err) => GenerationResult::Failure {
                status: err.status_code(),
                message: err.user_message(),
            },
        }
    }
}

/// JSON body of a successful generation.
#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub image: String,
    pub prompt: String,
}

impl From<GeneratedImage> for GenerationResponse {
    fn from(image: GeneratedImage) -> Self {
        Self {
            success: true,
            image: image.data_uri,
            prompt: image.prompt,
        }
    }
}
