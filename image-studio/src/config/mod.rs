use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;
use std::time::Duration;

/// Directory name of this service inside the workspace.
pub const SERVICE_DIR: &str = "image-studio";

pub const DEFAULT_MODEL: &str = "@cf/black-forest-labs/flux-2-dev";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub inference: InferenceSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound for a whole form submission, reference images included.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which image provider backs the generation proxy.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    WorkersAi,
    /// In-process provider returning a fixed image, for local runs.
    Mock,
}

#[derive(Deserialize, Clone)]
pub struct InferenceSettings {
    #[serde(default)]
    pub provider: ProviderKind,
    /// REST root of the inference API (e.g., https://api.cloudflare.com/client/v4).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default = "empty_secret")]
    pub api_token: Secret<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Client-side timeout for one generation call. Unset means wait for the provider.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

impl InferenceSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::load_settings(SERVICE_DIR)
}
