//! Typed errors for the product scraper.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can
//! match on the failure class: unsupported sources are rejected before a
//! job exists, render faults become failed records, store faults surface
//! to whoever attempted the write.

use thiserror::Error;
use uuid::Uuid;

use crate::types::job::JobStatus;

/// Errors raised by the rendering capability.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Navigation failed before a page handle existed
    #[error("navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// The page did not load within the renderer's operation timeout
    #[error("timed out loading {url}")]
    Timeout { url: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// A locator could not be parsed
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// An element handle no longer resolves against its page
    #[error("element is detached from the page")]
    Detached,

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised by a store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend rejected or failed the operation
    #[error("store backend error: {0}")]
    Backend(String),

    /// Document could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by the scrape service and job lifecycle manager.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No site profile recognizes the URL
    #[error("URL not supported by any available scraper: {url}")]
    UnsupportedSource { url: String },

    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Job id is unknown to the store
    #[error("job not found: {0}")]
    JobNotFound(Uuid),

    /// Product id is unknown to the store
    #[error("product not found: {0}")]
    ProductNotFound(Uuid),

    /// A lifecycle transition was requested from the wrong state
    #[error("cannot move job {job_id} from {from} to {to}")]
    InvalidTransition {
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },

    /// The job already used its retry budget
    #[error("job {job_id} exhausted its {max_retries} retries")]
    RetriesExhausted { job_id: Uuid, max_retries: u32 },

    /// Persistence failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Rendering failed
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
