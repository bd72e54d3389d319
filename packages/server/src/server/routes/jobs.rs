use axum::{
    extract::{Extension, Path},
    Json,
};
use product_scraper::{JobStatusView, PageRenderer, ProductStore, ScrapeResponse};
use uuid::Uuid;

use crate::server::{app::AppState, error::ApiError};

pub async fn job_status_handler<R, S>(
    Extension(state): Extension<AppState<R, S>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusView>, ApiError>
where
    R: PageRenderer + 'static,
    S: ProductStore + 'static,
{
    Ok(Json(state.service.job_status(job_id).await?))
}

/// Start a new attempt for a failed job.
///
/// 409 when the job is not failed or has used up its retries.
pub async fn retry_job_handler<R, S>(
    Extension(state): Extension<AppState<R, S>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ScrapeResponse>, ApiError>
where
    R: PageRenderer + 'static,
    S: ProductStore + 'static,
{
    let submission = state.service.retry_job(job_id).await?;
    Ok(Json(submission.response))
}
