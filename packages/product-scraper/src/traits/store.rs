//! Store adapter contract for products, the URL index, and jobs.
//!
//! The store is an external document service. The core relies on two
//! properties only: read-your-writes per document key, and `put_product`
//! upserting the URL index entry in the same logical operation. Concurrent
//! writes for the same URL resolve last-writer-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::types::{job::ScrapeJob, product::ProductRecord};
use crate::urls::{normalize_url, url_hash};

/// Maps a normalized URL to the product last produced for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlIndexEntry {
    /// SHA-256 of the normalized URL; the document key
    pub url_hash: String,

    /// Normalized URL, kept for inspection
    pub url: String,

    pub product_id: Uuid,

    pub updated_at: DateTime<Utc>,
}

impl UrlIndexEntry {
    /// Index entry pointing at a product record.
    pub fn for_product(record: &ProductRecord) -> Self {
        Self {
            url_hash: url_hash(&record.source_url),
            url: normalize_url(&record.source_url).unwrap_or_else(|| record.source_url.clone()),
            product_id: record.id,
            updated_at: Utc::now(),
        }
    }
}

/// Persistence for product records and scrape jobs.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Store a product and upsert its URL index entry.
    async fn put_product(&self, record: &ProductRecord) -> StoreResult<()>;

    /// Look up the latest product for a URL through the hash index.
    async fn get_product_by_url(&self, url: &str) -> StoreResult<Option<ProductRecord>>;

    async fn get_product_by_id(&self, id: Uuid) -> StoreResult<Option<ProductRecord>>;

    /// Create a job document.
    async fn put_job(&self, job: &ScrapeJob) -> StoreResult<()>;

    /// Overwrite an existing job document.
    async fn update_job(&self, job: &ScrapeJob) -> StoreResult<()>;

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<ScrapeJob>>;

    /// Delete completed or failed jobs that finished before `now - age`.
    ///
    /// Housekeeping only; the job lifecycle never calls this.
    ///
    /// Returns the number of jobs deleted.
    async fn delete_jobs_older_than(&self, age: chrono::Duration) -> StoreResult<usize>;
}
