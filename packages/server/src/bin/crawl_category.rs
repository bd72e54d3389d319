//! Crawl a category listing and write the discovered product URLs as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use product_scraper::{Extractor, HttpRenderer, PaginationCrawler};
use scrape_server::{crawl::CrawlReport, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crawl_category")]
#[command(about = "Collect product URLs from a paginated category listing")]
struct Cli {
    /// Category listing URL (first page)
    url: String,

    /// Stop after this many listing pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Where to write the JSON report
    #[arg(short, long, default_value = "product_urls.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,product_scraper=debug,scrape_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let renderer =
        HttpRenderer::new(config.renderer_config()).context("Failed to build HTTP renderer")?;
    let crawler = PaginationCrawler::new(Arc::new(Extractor::new(config.site_profile()?)));

    let urls = crawler
        .crawl_category(&renderer, &cli.url, cli.max_pages)
        .await;
    let report = CrawlReport::new(urls);

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    std::fs::write(&cli.output, json)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    tracing::info!(
        total_urls = report.total_urls,
        output = %cli.output.display(),
        "Category crawl finished"
    );

    Ok(())
}
