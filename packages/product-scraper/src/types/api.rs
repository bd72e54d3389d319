//! Request and response shapes of the scrape service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::{JobStatus, ScrapeJob, ScrapeOptions};
use super::product::ProductRecord;

fn default_true() -> bool {
    true
}

/// A request to scrape one product URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,

    /// Persist the resulting record
    #[serde(default = "default_true")]
    pub store_result: bool,

    #[serde(default)]
    pub include_nutrition: bool,

    /// Re-scrape even when a product already exists for the URL
    #[serde(default)]
    pub force_refresh: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            store_result: true,
            include_nutrition: false,
            force_refresh: false,
            webhook_url: None,
        }
    }

    pub fn with_nutrition(mut self, include: bool) -> Self {
        self.include_nutrition = include;
        self
    }

    pub fn with_force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn with_store_result(mut self, store: bool) -> Self {
        self.store_result = store;
        self
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Options carried by the job created for this request.
    pub fn options(&self) -> ScrapeOptions {
        ScrapeOptions {
            store_result: self.store_result,
            include_nutrition: self.include_nutrition,
            webhook_url: self.webhook_url.clone(),
        }
    }
}

/// Answer to a scrape submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    /// Absent when an existing product short-circuited the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,

    pub status: JobStatus,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,

    pub estimated_completion: DateTime<Utc>,
}

/// Externally visible state of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusView {
    pub job_id: Uuid,
    pub status: JobStatus,

    /// 0.0 until the job is terminal, then 1.0
    pub progress: f32,

    pub created_at: DateTime<Utc>,

    /// `completed_at` once finished, otherwise `created_at` plus the estimate
    pub estimated_completion: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_product_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl JobStatusView {
    pub fn from_job(job: &ScrapeJob, estimate: chrono::Duration) -> Self {
        Self {
            job_id: job.job_id,
            status: job.status,
            progress: job.progress(),
            created_at: job.created_at,
            estimated_completion: job.completed_at.unwrap_or(job.created_at + estimate),
            result_product_id: job.result_product_id,
            error_message: job.error_message.clone(),
        }
    }
}

/// A stored product as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub product: ProductRecord,

    /// Served from the store rather than scraped for this request
    pub cached: bool,

    pub last_updated: DateTime<Utc>,
}

impl From<ProductRecord> for ProductView {
    fn from(product: ProductRecord) -> Self {
        Self {
            last_updated: product.scraped_at,
            cached: true,
            product,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: ScrapeRequest =
            serde_json::from_str(r#"{"url": "https://www.traderjoes.com/home/products/pdp/a"}"#)
                .unwrap();
        assert!(request.store_result);
        assert!(!request.include_nutrition);
        assert!(!request.force_refresh);
        assert_eq!(request.webhook_url, None);
        assert_eq!(request.options(), ScrapeOptions::default());
    }

    #[test]
    fn test_status_view_estimates() {
        let estimate = chrono::Duration::minutes(5);
        let mut job = ScrapeJob::new("https://example.com/p", ScrapeOptions::default().to_bag());

        let view = JobStatusView::from_job(&job, estimate);
        assert_eq!(view.progress, 0.0);
        assert_eq!(view.estimated_completion, job.created_at + estimate);

        job.mark_processing().unwrap();
        job.mark_failed("timed out").unwrap();
        let view = JobStatusView::from_job(&job, estimate);
        assert_eq!(view.progress, 1.0);
        assert_eq!(Some(view.estimated_completion), job.completed_at);
        assert_eq!(view.error_message.as_deref(), Some("timed out"));
        assert_eq!(view.result_product_id, None);
    }
}
