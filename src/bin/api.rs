use defi_assistant::{
    agent::MockAssistant,
    api::{start_server, ApiState},
    backend::build_backend,
    config::AssistantConfig,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AssistantConfig::from_env()?;

    info!("🚀 DeFi Assistant - API Server");
    info!("📍 Port: {}", config.port);

    let assistant = Arc::new(MockAssistant::from_config(&config));
    let backend = build_backend(&config, assistant.clone())?;

    info!(
        backend = backend.name(),
        delay_ms = config.reply_delay.as_millis() as u64,
        jitter_ms = config.reply_jitter.as_millis() as u64,
        "✅ Assistant initialized"
    );
    info!("📡 Starting API server...");

    start_server(ApiState { backend, assistant }, config.port).await?;

    Ok(())
}
