use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use product_scraper::ScrapeError;
use serde::Serialize;

/// A [`ScrapeError`] rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub ScrapeError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ScrapeError::UnsupportedSource { .. } | ScrapeError::InvalidUrl { .. } => {
                StatusCode::BAD_REQUEST
            }
            ScrapeError::JobNotFound(_) | ScrapeError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            ScrapeError::InvalidTransition { .. } | ScrapeError::RetriesExhausted { .. } => {
                StatusCode::CONFLICT
            }
            ScrapeError::Store(_) | ScrapeError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
