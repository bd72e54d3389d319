// Main entry point for the scrape API server

use std::sync::Arc;

use anyhow::{Context, Result};
use product_scraper::{Extractor, HttpRenderer, MemoryStore, ScrapeService};
use scrape_server::{housekeeping, server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,product_scraper=debug,scrape_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting product scrape server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let profile = config.site_profile()?;
    tracing::info!(site_profile = %profile.name, "Configuration loaded");

    let renderer = Arc::new(
        HttpRenderer::new(config.renderer_config()).context("Failed to build HTTP renderer")?,
    );
    let store = Arc::new(MemoryStore::new());
    let service = ScrapeService::new(renderer, Arc::clone(&store), Extractor::new(profile))
        .with_estimated_completion(config.estimated_completion());

    let _housekeeping = housekeeping::spawn(
        store,
        config.job_retention(),
        config.housekeeping_interval(),
    );

    let app = build_app(service);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
