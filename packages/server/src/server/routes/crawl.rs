use axum::{extract::Extension, Json};
use product_scraper::{urls::normalize_url, PageRenderer, ProductStore, ScrapeError};

use crate::crawl::{CrawlReport, CrawlRequest};
use crate::server::{app::AppState, error::ApiError};

/// Crawl a category listing and return the discovered product URLs.
///
/// Load faults end the crawl early; the URLs gathered so far are returned.
pub async fn crawl_handler<R, S>(
    Extension(state): Extension<AppState<R, S>>,
    Json(request): Json<CrawlRequest>,
) -> Result<Json<CrawlReport>, ApiError>
where
    R: PageRenderer + 'static,
    S: ProductStore + 'static,
{
    let start_url = normalize_url(&request.url).ok_or_else(|| ScrapeError::InvalidUrl {
        url: request.url.clone(),
    })?;

    let urls = state
        .service
        .crawl_category(&start_url, request.max_pages)
        .await;
    Ok(Json(CrawlReport::new(urls)))
}
