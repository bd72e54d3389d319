//! Job lifecycle manager.
//!
//! ```text
//! pending -> processing -> completed
//!                       \-> failed
//! ```
//!
//! Every transition is persisted before it is reflected in the caller's
//! job value, so a failed store write leaves the in-memory job exactly as
//! it was. Failed jobs are never re-driven here; `retry` creates a new job.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, ScrapeError};
use crate::traits::store::ProductStore;
use crate::types::job::{ScrapeJob, ScrapeOptions};
use crate::urls::normalize_url;

/// Result of accepting a scrape request.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptOutcome {
    /// A product already exists for the URL; no job was created
    Existing { product_id: Uuid },

    /// A new pending job was persisted
    Created(ScrapeJob),
}

/// Coordinates job state through a [`ProductStore`].
pub struct JobManager<S> {
    store: Arc<S>,
}

impl<S> Clone for JobManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ProductStore> JobManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a job for a URL unless a product already exists for it.
    ///
    /// `force_refresh` skips the existing-product lookup.
    pub async fn accept(
        &self,
        url: &str,
        options: &ScrapeOptions,
        force_refresh: bool,
    ) -> Result<AcceptOutcome> {
        let normalized = normalize_url(url).ok_or_else(|| ScrapeError::InvalidUrl {
            url: url.to_string(),
        })?;

        if !force_refresh {
            if let Some(product) = self.store.get_product_by_url(&normalized).await? {
                debug!(url = %normalized, product_id = %product.id, "Product already exists");
                return Ok(AcceptOutcome::Existing {
                    product_id: product.id,
                });
            }
        }

        let job = ScrapeJob::new(normalized, options.to_bag());
        self.store.put_job(&job).await?;
        info!(job_id = %job.job_id, url = %job.url, "Created scrape job");

        Ok(AcceptOutcome::Created(job))
    }

    /// `pending -> processing`
    pub async fn begin(&self, job: &mut ScrapeJob) -> Result<()> {
        let mut next = job.clone();
        next.mark_processing()?;
        self.persist(job, next).await
    }

    /// `processing -> completed`
    pub async fn succeed(&self, job: &mut ScrapeJob, product_id: Uuid) -> Result<()> {
        let mut next = job.clone();
        next.mark_completed(product_id)?;
        self.persist(job, next).await
    }

    /// `processing -> failed`
    pub async fn fail(&self, job: &mut ScrapeJob, error: impl Into<String>) -> Result<()> {
        let mut next = job.clone();
        next.mark_failed(error)?;
        self.persist(job, next).await
    }

    async fn persist(&self, job: &mut ScrapeJob, next: ScrapeJob) -> Result<()> {
        self.store.update_job(&next).await?;
        debug!(job_id = %next.job_id, from = %job.status, to = %next.status, "Job transitioned");
        *job = next;
        Ok(())
    }

    pub async fn get(&self, job_id: Uuid) -> Result<ScrapeJob> {
        self.store
            .get_job(job_id)
            .await?
            .ok_or(ScrapeError::JobNotFound(job_id))
    }

    /// New pending job for a failed job's URL and options.
    pub async fn retry(&self, job_id: Uuid) -> Result<ScrapeJob> {
        let failed = self.get(job_id).await?;
        let job = ScrapeJob::retry_of(&failed)?;
        self.store.put_job(&job).await?;
        info!(
            job_id = %job.job_id,
            retry_of = %failed.job_id,
            retry_count = job.retry_count,
            "Created retry job"
        );
        Ok(job)
    }
}
