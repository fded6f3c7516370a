use crate::error::GenerationError;
use crate::handlers::app::IndexTemplate;
use crate::models::{
    GenerationRequest, GenerationResponse, GenerationResult, ReferenceImage,
    MAX_REFERENCE_IMAGES,
};
use crate::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub const PROMPT_FIELD: &str = "prompt";
pub const IMAGES_FIELD: &str = "images";

/// Read `prompt` and `images` from a multipart submission.
///
/// Unknown fields are ignored. Image parts past the fourth kept one are
/// skipped without being buffered.
pub async fn read_submission(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<GenerationRequest, GenerationError> {
    let form_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GenerationError::PayloadTooLarge(max_upload_bytes)
        } else {
            GenerationError::InvalidForm(e.body_text())
        }
    };

    let mut prompt: Option<String> = None;
    let mut images = Vec::new();
    let mut skipped = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(PROMPT_FIELD) => {
                let text = field.text().await.map_err(form_error)?;
                prompt.get_or_insert(text);
            }
            Some(IMAGES_FIELD) => {
                if images.len() >= MAX_REFERENCE_IMAGES {
                    skipped += 1;
                    continue;
                }
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(form_error)?;
                if !data.is_empty() {
                    images.push(ReferenceImage::new(file_name, content_type, data));
                }
            }
            _ => {}
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Ignoring reference images beyond the limit");
    }

    GenerationRequest::new(prompt.unwrap_or_default(), images)
}

async fn read_request(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<GenerationRequest, GenerationError> {
    let multipart = multipart.map_err(|e| GenerationError::InvalidForm(e.body_text()))?;
    read_submission(multipart, state.max_upload_bytes).await
}

/// `POST /api/generate`: JSON contract of the generation proxy.
pub async fn generate_api(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>, GenerationError> {
    let request = read_request(&state, multipart).await?;
    let image = state.generation.generate(&request).await?;
    Ok(Json(image.into()))
}

/// `POST /`: same flow, rendered back into the form page.
///
/// The submitted prompt is echoed into the form whatever the outcome.
pub async fn generate_page(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let (prompt, outcome) = match read_request(&state, multipart).await {
        Ok(request) => {
            let outcome = state.generation.generate(&request).await;
            (request.prompt().to_string(), outcome)
        }
        Err(e) => (String::new(), Err(e)),
    };

    let result = GenerationResult::from(outcome);
    let status = result.status();
    let page = IndexTemplate::new(state.generation.provider().model(), Some(result))
        .with_prompt(prompt);
    (status, page).into_response()
}
