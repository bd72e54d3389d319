//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{ProductStore, UrlIndexEntry};
use crate::types::{job::ScrapeJob, product::ProductRecord};
use crate::urls::url_hash;

/// In-memory storage for products, the URL index, and jobs.
///
/// Not suitable for production as data is lost on restart.
pub struct MemoryStore {
    products: RwLock<HashMap<Uuid, ProductRecord>>,
    url_index: RwLock<HashMap<String, UrlIndexEntry>>,
    jobs: RwLock<HashMap<Uuid, ScrapeJob>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            url_index: RwLock::new(HashMap::new()),
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of stored products.
    pub fn product_count(&self) -> usize {
        self.products.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Get the number of stored jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.read().map(|j| j.len()).unwrap_or(0)
    }

    /// Index entry for a URL, if one exists.
    pub fn index_entry(&self, url: &str) -> StoreResult<Option<UrlIndexEntry>> {
        Ok(read(&self.url_index)?.get(&url_hash(url)).cloned())
    }
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn put_product(&self, record: &ProductRecord) -> StoreResult<()> {
        let entry = UrlIndexEntry::for_product(record);
        write(&self.products)?.insert(record.id, record.clone());
        write(&self.url_index)?.insert(entry.url_hash.clone(), entry);
        Ok(())
    }

    async fn get_product_by_url(&self, url: &str) -> StoreResult<Option<ProductRecord>> {
        let product_id = match read(&self.url_index)?.get(&url_hash(url)) {
            Some(entry) => entry.product_id,
            None => return Ok(None),
        };
        Ok(read(&self.products)?.get(&product_id).cloned())
    }

    async fn get_product_by_id(&self, id: Uuid) -> StoreResult<Option<ProductRecord>> {
        Ok(read(&self.products)?.get(&id).cloned())
    }

    async fn put_job(&self, job: &ScrapeJob) -> StoreResult<()> {
        write(&self.jobs)?.insert(job.job_id, job.clone());
        Ok(())
    }

    async fn update_job(&self, job: &ScrapeJob) -> StoreResult<()> {
        let mut jobs = write(&self.jobs)?;
        match jobs.get_mut(&job.job_id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!("job {} does not exist", job.job_id))),
        }
    }

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<ScrapeJob>> {
        Ok(read(&self.jobs)?.get(&job_id).cloned())
    }

    async fn delete_jobs_older_than(&self, age: chrono::Duration) -> StoreResult<usize> {
        let cutoff = Utc::now() - age;
        let mut jobs = write(&self.jobs)?;
        let before = jobs.len();
        jobs.retain(|_, job| {
            !(job.status.is_terminal() && job.completed_at.is_some_and(|at| at < cutoff))
        });
        Ok(before - jobs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::{JobStatus, ScrapeOptions};

    fn record(url: &str) -> ProductRecord {
        ProductRecord::new(url, "test").with_name("Bread").succeeded(0.1)
    }

    #[tokio::test]
    async fn test_put_product_updates_url_index() {
        let store = MemoryStore::new();
        let first = record("https://www.traderjoes.com/home/products/pdp/bread-1");
        store.put_product(&first).await.unwrap();

        let found = store
            .get_product_by_url("https://www.traderjoes.com/home/products/pdp/bread-1/")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);

        let second = record("https://www.traderjoes.com/home/products/pdp/bread-1");
        store.put_product(&second).await.unwrap();

        let found = store
            .get_product_by_url("https://www.traderjoes.com/home/products/pdp/bread-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, second.id);
        assert_eq!(store.product_count(), 2);
        assert!(store.get_product_by_id(first.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_job_requires_existing() {
        let store = MemoryStore::new();
        let job = ScrapeJob::new("https://example.com/p", ScrapeOptions::default().to_bag());

        assert!(store.update_job(&job).await.is_err());

        store.put_job(&job).await.unwrap();
        let mut changed = job.clone();
        changed.mark_processing().unwrap();
        store.update_job(&changed).await.unwrap();

        let loaded = store.get_job(job.job_id).await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn test_delete_jobs_older_than_keeps_active_and_recent() {
        let store = MemoryStore::new();
        let options = ScrapeOptions::default().to_bag();

        let pending = ScrapeJob::new("https://example.com/a", options.clone());

        let mut old_done = ScrapeJob::new("https://example.com/b", options.clone());
        old_done.mark_processing().unwrap();
        old_done.mark_completed(Uuid::new_v4()).unwrap();
        old_done.completed_at = Some(Utc::now() - chrono::Duration::days(10));

        let mut recent_failed = ScrapeJob::new("https://example.com/c", options);
        recent_failed.mark_processing().unwrap();
        recent_failed.mark_failed("boom").unwrap();

        for job in [&pending, &old_done, &recent_failed] {
            store.put_job(job).await.unwrap();
        }

        let deleted = store
            .delete_jobs_older_than(chrono::Duration::days(7))
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(store.get_job(old_done.job_id).await.unwrap().is_none());
        assert!(store.get_job(pending.job_id).await.unwrap().is_some());
        assert!(store.get_job(recent_failed.job_id).await.unwrap().is_some());
    }
}
