//! Scrape job model and its state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::error::{Result, ScrapeError};

/// Default retry ceiling for new jobs.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Options
// ============================================================================

/// Opaque per-job configuration bag, stored verbatim with the job.
pub type OptionsBag = HashMap<String, serde_json::Value>;

/// Typed view over the options a scrape request carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeOptions {
    /// Persist the resulting product record
    pub store_result: bool,

    /// Extract nutrition facts
    pub include_nutrition: bool,

    /// Completion callback. Carried with the job; delivery is not performed.
    pub webhook_url: Option<String>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            store_result: true,
            include_nutrition: false,
            webhook_url: None,
        }
    }
}

impl ScrapeOptions {
    const STORE_RESULT: &'static str = "store_result";
    const INCLUDE_NUTRITION: &'static str = "include_nutrition";
    const WEBHOOK_URL: &'static str = "webhook_url";

    /// Encode into the job's options bag.
    pub fn to_bag(&self) -> OptionsBag {
        let mut bag = OptionsBag::new();
        bag.insert(Self::STORE_RESULT.into(), self.store_result.into());
        bag.insert(Self::INCLUDE_NUTRITION.into(), self.include_nutrition.into());
        if let Some(url) = &self.webhook_url {
            bag.insert(Self::WEBHOOK_URL.into(), url.clone().into());
        }
        bag
    }

    /// Decode from an options bag; missing or mistyped keys fall back to defaults.
    pub fn from_bag(bag: &OptionsBag) -> Self {
        let defaults = Self::default();
        Self {
            store_result: bag
                .get(Self::STORE_RESULT)
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.store_result),
            include_nutrition: bag
                .get(Self::INCLUDE_NUTRITION)
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.include_nutrition),
            webhook_url: bag
                .get(Self::WEBHOOK_URL)
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }
    }
}

// ============================================================================
// Job Model
// ============================================================================

/// One asynchronous extraction request.
///
/// Transitions go through `mark_*` methods, which refuse moves the state
/// machine does not allow and keep `result_product_id` / `error_message`
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeJob {
    pub job_id: Uuid,
    pub url: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_product_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub options: OptionsBag,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl ScrapeJob {
    /// Create a pending job for a URL.
    pub fn new(url: impl Into<String>, options: OptionsBag) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            url: url.into(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result_product_id: None,
            error_message: None,
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            options,
        }
    }

    /// Retry ceiling, at least 1 so every failure can be counted.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Create a fresh pending job for the same URL and options.
    ///
    /// The retry budget carries over so a chain of retries still stops at
    /// `max_retries`.
    pub fn retry_of(failed: &ScrapeJob) -> Result<Self> {
        if failed.status != JobStatus::Failed {
            return Err(ScrapeError::InvalidTransition {
                job_id: failed.job_id,
                from: failed.status,
                to: JobStatus::Pending,
            });
        }
        if failed.retries_exhausted() {
            return Err(ScrapeError::RetriesExhausted {
                job_id: failed.job_id,
                max_retries: failed.max_retries,
            });
        }

        let mut job = Self::new(failed.url.clone(), failed.options.clone())
            .with_max_retries(failed.max_retries);
        job.retry_count = failed.retry_count;
        Ok(job)
    }

    /// Typed view of the options bag.
    pub fn scrape_options(&self) -> ScrapeOptions {
        ScrapeOptions::from_bag(&self.options)
    }

    /// `pending -> processing`
    pub fn mark_processing(&mut self) -> Result<()> {
        self.expect_status(JobStatus::Pending, JobStatus::Processing)?;
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// `processing -> completed`
    pub fn mark_completed(&mut self, product_id: Uuid) -> Result<()> {
        self.expect_status(JobStatus::Processing, JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.result_product_id = Some(product_id);
        self.error_message = None;
        Ok(())
    }

    /// `processing -> failed`, consuming one retry.
    ///
    /// The count is capped at `max_retries`. Jobs built here always have
    /// room for the increment; the cap only holds back stored jobs that
    /// arrive already at the ceiling.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<()> {
        self.expect_status(JobStatus::Processing, JobStatus::Failed)?;
        self.status = JobStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(error.into());
        self.result_product_id = None;
        self.retry_count = (self.retry_count + 1).min(self.max_retries);
        Ok(())
    }

    /// Whether another retry may be created from this job.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    /// 1.0 once the job reached a terminal state, 0.0 before.
    pub fn progress(&self) -> f32 {
        if self.status.is_terminal() {
            1.0
        } else {
            0.0
        }
    }

    fn expect_status(&self, expected: JobStatus, to: JobStatus) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(ScrapeError::InvalidTransition {
                job_id: self.job_id,
                from: self.status,
                to,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ScrapeJob {
        ScrapeJob::new("https://www.traderjoes.com/home/products/pdp/a-1", ScrapeOptions::default().to_bag())
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut job = job();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress(), 0.0);

        job.mark_processing().unwrap();
        assert!(job.started_at.is_some());

        let product_id = Uuid::new_v4();
        job.mark_completed(product_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result_product_id, Some(product_id));
        assert!(job.error_message.is_none());
        assert!(job.completed_at.is_some());
        assert_eq!(job.progress(), 1.0);
    }

    #[test]
    fn test_failure_increments_retry_count() {
        let mut job = job();
        job.mark_processing().unwrap();
        job.mark_failed("timed out").unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.retry_count, 1);
        assert_eq!(job.error_message.as_deref(), Some("timed out"));
        assert!(job.result_product_id.is_none());
    }

    #[test]
    fn test_zero_retry_ceiling_still_counts_failure() {
        let mut job = job().with_max_retries(0);
        assert_eq!(job.max_retries, 1);

        job.mark_processing().unwrap();
        job.mark_failed("timed out").unwrap();
        assert_eq!(job.retry_count, 1);
        assert!(job.retries_exhausted());
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut job = job();
        assert!(matches!(
            job.mark_completed(Uuid::new_v4()),
            Err(ScrapeError::InvalidTransition { from: JobStatus::Pending, .. })
        ));
        assert!(job.mark_failed("x").is_err());

        job.mark_processing().unwrap();
        assert!(job.mark_processing().is_err());

        job.mark_completed(Uuid::new_v4()).unwrap();
        assert!(job.mark_failed("late").is_err());
        assert!(job.error_message.is_none());
    }

    #[test]
    fn test_retry_inherits_budget_and_stops_at_ceiling() {
        let mut current = job().with_max_retries(2);
        current.mark_processing().unwrap();
        current.mark_failed("one").unwrap();

        let mut retry = ScrapeJob::retry_of(&current).unwrap();
        assert_ne!(retry.job_id, current.job_id);
        assert_eq!(retry.retry_count, 1);
        assert_eq!(retry.status, JobStatus::Pending);
        assert_eq!(retry.options, current.options);

        retry.mark_processing().unwrap();
        retry.mark_failed("two").unwrap();
        assert_eq!(retry.retry_count, 2);
        assert!(matches!(
            ScrapeJob::retry_of(&retry),
            Err(ScrapeError::RetriesExhausted { max_retries: 2, .. })
        ));
    }

    #[test]
    fn test_retry_requires_failed_job() {
        let job = job();
        assert!(ScrapeJob::retry_of(&job).is_err());
    }

    #[test]
    fn test_options_bag_round_trip() {
        let options = ScrapeOptions {
            store_result: false,
            include_nutrition: true,
            webhook_url: Some("https://hooks.example.com/done".into()),
        };
        let bag = options.to_bag();
        assert_eq!(ScrapeOptions::from_bag(&bag), options);
        assert_eq!(ScrapeOptions::from_bag(&OptionsBag::new()), ScrapeOptions::default());
    }
}
