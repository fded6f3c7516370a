use dotenvy::dotenv;
use image_studio::config::get_configuration;
use image_studio::services::init_metrics;
use image_studio::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "image-studio",
        &configuration.server.log_level,
        configuration.server.otlp_endpoint.as_deref(),
    );

    // Must be installed before the first request records anything
    init_metrics()?;

    let application = Application::build(configuration).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    application.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
