use anyhow::Result;
use clap::Parser;
use shortener::clock::SystemClock;
use shortener::config::Config;
use shortener::events::{FanoutObserver, TracingObserver};
use shortener::server::Server;
use shortener::service::UrlShortener;
use shortener::telemetry::TelemetrySink;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::parse();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("shortener={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting URL shortener service");
    tracing::info!(
        "Configuration: bind_addr={}, base_url={}, telemetry={}",
        config.bind_addr,
        config.base_url,
        config.telemetry_url.as_deref().unwrap_or("disabled")
    );

    let mut observer = FanoutObserver::new().with(Arc::new(TracingObserver));
    if let Some(url) = &config.telemetry_url {
        let sink = TelemetrySink::new(url.clone(), config.telemetry_token.clone())
            .map_err(|e| anyhow::anyhow!("Failed to set up telemetry: {}", e))?;
        observer = observer.with(Arc::new(sink));
    }

    let shortener = Arc::new(UrlShortener::from_config(
        &config,
        Arc::new(SystemClock),
        Arc::new(observer),
    ));

    Server::new(config.bind_addr, shortener)
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
