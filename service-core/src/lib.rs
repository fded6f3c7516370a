//! service-core: Shared infrastructure for the image-studio services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
