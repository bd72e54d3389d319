//! Scrape service: submission, asynchronous processing, and queries.
//!
//! Submission validates the URL against the site profile, deduplicates via
//! the job manager, and spawns one task per new job. The task owns its
//! `ScrapeJob` exclusively; the returned handle lets callers await it.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

use crate::crawler::PaginationCrawler;
use crate::error::{Result, ScrapeError};
use crate::extractor::Extractor;
use crate::jobs::{AcceptOutcome, JobManager};
use crate::traits::renderer::PageRenderer;
use crate::traits::store::ProductStore;
use crate::types::api::{JobStatusView, ProductView, ScrapeRequest, ScrapeResponse};
use crate::types::job::{JobStatus, ScrapeJob};

/// Default completion estimate reported for pending jobs, in seconds.
pub const DEFAULT_ESTIMATED_COMPLETION_SECS: i64 = 300;

/// What `submit` hands back.
pub struct Submission {
    pub response: ScrapeResponse,

    /// Handle of the processing task; `None` when no job was created
    pub handle: Option<JoinHandle<Result<ScrapeJob>>>,
}

/// Entry point for scraping, job queries, and category crawls.
pub struct ScrapeService<R, S> {
    renderer: Arc<R>,
    jobs: JobManager<S>,
    extractor: Arc<Extractor>,
    crawler: PaginationCrawler,
    estimated_completion: chrono::Duration,
}

impl<R, S> Clone for ScrapeService<R, S> {
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            jobs: self.jobs.clone(),
            extractor: Arc::clone(&self.extractor),
            crawler: self.crawler.clone(),
            estimated_completion: self.estimated_completion,
        }
    }
}

impl<R, S> ScrapeService<R, S>
where
    R: PageRenderer + 'static,
    S: ProductStore + 'static,
{
    pub fn new(renderer: Arc<R>, store: Arc<S>, extractor: Extractor) -> Self {
        let extractor = Arc::new(extractor);
        Self {
            renderer,
            jobs: JobManager::new(store),
            crawler: PaginationCrawler::new(Arc::clone(&extractor)),
            extractor,
            estimated_completion: chrono::Duration::seconds(DEFAULT_ESTIMATED_COMPLETION_SECS),
        }
    }

    pub fn with_estimated_completion(mut self, estimate: chrono::Duration) -> Self {
        self.estimated_completion = estimate;
        self
    }

    pub fn jobs(&self) -> &JobManager<S> {
        &self.jobs
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Whether the configured site profile accepts the URL.
    pub fn can_handle(&self, url: &str) -> bool {
        self.extractor.profile().can_handle(url)
    }

    /// Accept a scrape request and start processing it in the background.
    ///
    /// Unsupported URLs are rejected before any job exists. When a product
    /// already exists for the URL and `force_refresh` is off, the response
    /// points at it and no task is spawned.
    pub async fn submit(&self, request: ScrapeRequest) -> Result<Submission> {
        if !self.can_handle(&request.url) {
            return Err(ScrapeError::UnsupportedSource { url: request.url });
        }

        let options = request.options();
        let outcome = self
            .jobs
            .accept(&request.url, &options, request.force_refresh)
            .await?;

        match outcome {
            AcceptOutcome::Existing { product_id } => Ok(Submission {
                response: ScrapeResponse {
                    job_id: None,
                    status: JobStatus::Completed,
                    message: "Product already exists".into(),
                    product_id: Some(product_id),
                    estimated_completion: Utc::now(),
                },
                handle: None,
            }),
            AcceptOutcome::Created(job) => {
                let response = ScrapeResponse {
                    job_id: Some(job.job_id),
                    status: job.status,
                    message: "Scraping job started".into(),
                    product_id: None,
                    estimated_completion: Utc::now() + self.estimated_completion,
                };

                let service = self.clone();
                let span = info_span!("scrape_job", job_id = %job.job_id);
                let handle = tokio::spawn(async move { service.process(job).await }.instrument(span));

                Ok(Submission {
                    response,
                    handle: Some(handle),
                })
            }
        }
    }

    /// Run one job to a terminal state.
    ///
    /// Returns the final job. A store fault on the product write fails the
    /// job and is returned as the error; a store fault on the final job
    /// write is returned and the stored job may remain `processing`.
    pub async fn process(&self, mut job: ScrapeJob) -> Result<ScrapeJob> {
        self.jobs.begin(&mut job).await?;

        let options = job.scrape_options();
        let record = self
            .extractor
            .scrape(self.renderer.as_ref(), &job.url, &options)
            .await;

        if !record.is_success() {
            let message = record
                .error_message
                .clone()
                .unwrap_or_else(|| "scrape failed".into());
            warn!(url = %job.url, error = %message, "Scrape failed");
            self.jobs.fail(&mut job, message).await?;
            return Ok(job);
        }

        if options.store_result {
            if let Err(e) = self.jobs.store().put_product(&record).await {
                error!(product_id = %record.id, error = %e, "Failed to store product");
                if let Err(fail_err) = self.jobs.fail(&mut job, e.to_string()).await {
                    error!(error = %fail_err, "Failed to record job failure");
                }
                return Err(e.into());
            }
        }

        self.jobs.succeed(&mut job, record.id).await?;
        info!(url = %job.url, product_id = %record.id, "Scrape job completed");
        Ok(job)
    }

    pub async fn job_status(&self, job_id: Uuid) -> Result<JobStatusView> {
        let job = self.jobs.get(job_id).await?;
        Ok(JobStatusView::from_job(&job, self.estimated_completion))
    }

    pub async fn product(&self, product_id: Uuid) -> Result<ProductView> {
        self.jobs
            .store()
            .get_product_by_id(product_id)
            .await?
            .map(ProductView::from)
            .ok_or(ScrapeError::ProductNotFound(product_id))
    }

    /// Create and start a retry of a failed job.
    pub async fn retry_job(&self, job_id: Uuid) -> Result<Submission> {
        let job = self.jobs.retry(job_id).await?;
        let response = ScrapeResponse {
            job_id: Some(job.job_id),
            status: job.status,
            message: format!("Retry {} of {} started", job.retry_count, job.max_retries),
            product_id: None,
            estimated_completion: Utc::now() + self.estimated_completion,
        };

        let service = self.clone();
        let span = info_span!("scrape_job", job_id = %job.job_id);
        let handle = tokio::spawn(async move { service.process(job).await }.instrument(span));

        Ok(Submission {
            response,
            handle: Some(handle),
        })
    }

    /// Product URLs of a category listing.
    #[instrument(skip(self))]
    pub async fn crawl_category(&self, start_url: &str, page_cap: Option<u32>) -> Vec<String> {
        self.crawler
            .crawl_category(self.renderer.as_ref(), start_url, page_cap)
            .await
    }
}
