//! Application setup and router.

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use product_scraper::{PageRenderer, ProductStore, ScrapeService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::routes::{
    crawl_handler, health_handler, job_status_handler, product_handler, retry_job_handler,
    scrape_handler,
};

/// Shared application state
pub struct AppState<R, S> {
    pub service: ScrapeService<R, S>,
}

impl<R, S> Clone for AppState<R, S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// Build the Axum application router
pub fn build_app<R, S>(service: ScrapeService<R, S>) -> Router
where
    R: PageRenderer + 'static,
    S: ProductStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/scrape", post(scrape_handler::<R, S>))
        .route("/job/:job_id", get(job_status_handler::<R, S>))
        .route("/job/:job_id/retry", post(retry_job_handler::<R, S>))
        .route("/product/:product_id", get(product_handler::<R, S>))
        .route("/crawl", post(crawl_handler::<R, S>))
        .route("/health", get(health_handler::<R, S>))
        .layer(Extension(AppState { service }))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
