pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use services::GenerationService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub generation: GenerationService,
    /// Limit applied to form submissions, echoed in 413 errors.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(generation: GenerationService, max_upload_bytes: usize) -> Self {
        Self {
            generation,
            max_upload_bytes,
        }
    }
}
