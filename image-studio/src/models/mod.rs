pub mod generation;

pub use generation::{
    GeneratedImage, GenerationRequest, GenerationResponse, GenerationResult, ReferenceImage,
    MAX_REFERENCE_IMAGES,
};
