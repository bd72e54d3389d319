use axum::{
    extract::{Extension, Path},
    Json,
};
use product_scraper::{PageRenderer, ProductStore, ProductView, ScrapeRequest, ScrapeResponse};
use uuid::Uuid;

use crate::server::{app::AppState, error::ApiError};

/// Submit a product URL for scraping.
///
/// The processing task runs detached; poll `GET /job/:job_id` for its state.
pub async fn scrape_handler<R, S>(
    Extension(state): Extension<AppState<R, S>>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError>
where
    R: PageRenderer + 'static,
    S: ProductStore + 'static,
{
    let submission = state.service.submit(request).await?;
    Ok(Json(submission.response))
}

pub async fn product_handler<R, S>(
    Extension(state): Extension<AppState<R, S>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductView>, ApiError>
where
    R: PageRenderer + 'static,
    S: ProductStore + 'static,
{
    Ok(Json(state.service.product(product_id).await?))
}
