mod config;
mod flow;
mod gemini;
mod models;
mod photo;
mod quiz;
mod ui;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gemini::GeminiClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lumiskin v{}", env!("CARGO_PKG_VERSION"));

    if config.gemini_api_key.is_none() {
        // Not fatal: the wizard runs, the analysis attempt fails with the
        // generic message and the user lands back on the upload step.
        warn!("GEMINI_API_KEY is not set; analysis requests will fail");
    }

    let analyzer = GeminiClient::new(config.gemini_api_key.clone());
    info!("Gemini client initialized (model: {})", gemini::MODEL);

    ui::run(&analyzer).await
}
