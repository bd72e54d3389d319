use axum::{extract::Extension, Json};
use product_scraper::{PageRenderer, ProductStore};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    site_profile: String,
    extractor_version: String,
}

/// Health check endpoint
pub async fn health_handler<R, S>(Extension(state): Extension<AppState<R, S>>) -> Json<HealthResponse>
where
    R: PageRenderer + 'static,
    S: ProductStore + 'static,
{
    let extractor = state.service.extractor();
    Json(HealthResponse {
        status: "ok".to_string(),
        site_profile: extractor.profile().name.clone(),
        extractor_version: extractor.version().to_string(),
    })
}
