mod config;
mod constants;
mod error;
mod formatters;
mod models;
mod service;
mod truncation;

use anyhow::Result;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::constants::API_KEY_ENV;
use crate::service::Weather;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uk_weather_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting MCP weather server");

    let config = Config::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!("{API_KEY_ENV} is not set; forecast tools will return a configuration error");
    }
    tracing::info!(api_base = %config.api_base, timeout = ?config.timeout, "Loaded configuration");

    let weather = Weather::new(config)?;
    let server = weather.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
