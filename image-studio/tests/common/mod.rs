#![allow(dead_code)]

use image_studio::config::{InferenceSettings, ProviderKind, ServerSettings, Settings};
use image_studio::services::providers::{ImageProvider, MockImageProvider};
use image_studio::startup::Application;
use reqwest::multipart::{Form, Part};
use secrecy::Secret;
use std::sync::Arc;

pub const TEST_UPLOAD_LIMIT: usize = 64 * 1024;

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port for testing
            max_upload_bytes: TEST_UPLOAD_LIMIT,
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
        inference: InferenceSettings {
            provider: ProviderKind::Mock,
            base_url: "http://127.0.0.1:1".to_string(),
            account_id: String::new(),
            api_token: Secret::new(String::new()),
            model: "mock/image".to_string(),
            timeout_seconds: None,
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the app around a mock provider and return both.
    pub async fn spawn_with_mock(provider: MockImageProvider) -> (Self, Arc<MockImageProvider>) {
        let provider = Arc::new(provider);
        let app = Self::spawn_with_provider(test_settings(), provider.clone()).await;
        (app, provider)
    }

    pub async fn spawn(settings: Settings) -> Self {
        let app = Application::build(settings)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    pub async fn spawn_with_provider(settings: Settings, provider: Arc<dyn ImageProvider>) -> Self {
        let app = Application::build_with_provider(settings, provider)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn post_api(&self, form: Form) -> reqwest::Response {
        self.client
            .post(format!("{}/api/generate", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_page(&self, form: Form) -> reqwest::Response {
        self.client
            .post(format!("{}/", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn image_part(name: &str, len: usize) -> Part {
    Part::bytes(vec![0xAB; len])
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

/// Form with `prompt` and one `images` part per entry of `sizes`.
pub fn generation_form(prompt: &str, sizes: &[usize]) -> Form {
    sizes
        .iter()
        .enumerate()
        .fold(Form::new().text("prompt", prompt.to_string()), |form, (i, len)| {
            form.part("images", image_part(&format!("ref{}.png", i), *len))
        })
}
