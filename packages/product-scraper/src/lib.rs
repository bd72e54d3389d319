//! Product Page Scraper
//!
//! Extracts structured product records (name, price, ingredients, allergens,
//! nutrition) from e-commerce product pages, discovers product URLs by
//! crawling paginated category listings, and tracks each extraction as an
//! asynchronous job.
//!
//! # Design
//!
//! - Extract what is extractable, never crash, always return a typed record
//! - Site specifics live in a [`SiteProfile`], not in code
//! - Rendering and persistence are traits; the library drives neither a
//!   browser nor a database itself
//!
//! # Usage
//!
//! ```rust,ignore
//! use product_scraper::{Extractor, HttpRenderer, MemoryStore, RendererConfig, ScrapeRequest, ScrapeService};
//! use std::sync::Arc;
//!
//! let renderer = Arc::new(HttpRenderer::new(RendererConfig::default())?);
//! let store = Arc::new(MemoryStore::new());
//! let service = ScrapeService::new(renderer, store, Extractor::default());
//!
//! let submission = service
//!     .submit(ScrapeRequest::new("https://www.traderjoes.com/home/products/pdp/mango-salsa-012345"))
//!     .await?;
//! if let Some(handle) = submission.handle {
//!     let job = handle.await??;
//!     println!("{:?}", service.job_status(job.job_id).await?);
//! }
//! ```
//!
//! # Modules
//!
//! - [`parsers`] - Pure text parsers (ingredients, allergens, nutrition, price)
//! - [`strategy`] - Locator strategies and `try_extract`
//! - [`extractor`] - Selector-fallback extractor
//! - [`crawler`] - Pagination crawler for category listings
//! - [`jobs`] - Job lifecycle manager
//! - [`service`] - Submission, processing, and queries
//! - [`traits`] - Renderer and store abstractions
//! - [`stores`] - Storage implementations (MemoryStore)
//! - [`renderers`] - Renderer implementations (HttpRenderer)
//! - [`testing`] - Mock implementations for testing

pub mod crawler;
pub mod error;
pub mod extractor;
pub mod jobs;
pub mod parsers;
pub mod renderers;
pub mod service;
pub mod stores;
pub mod strategy;
pub mod testing;
pub mod traits;
pub mod types;
pub mod urls;

// Re-export core types at crate root
pub use crawler::{NextPage, PaginationCrawler};
pub use error::{RenderError, Result, ScrapeError, StoreError};
pub use extractor::Extractor;
pub use jobs::{AcceptOutcome, JobManager};
pub use renderers::{HtmlElement, HtmlPage, HttpRenderer, RendererConfig};
pub use service::{ScrapeService, Submission};
pub use stores::MemoryStore;
pub use strategy::{try_extract, LocatorStrategy};
pub use traits::{
    renderer::{Element, Page, PageRenderer},
    store::{ProductStore, UrlIndexEntry},
};
pub use types::{
    api::{JobStatusView, ProductView, ScrapeRequest, ScrapeResponse},
    config::{ExtractorConfig, FieldStrategies, PaginationConfig, SiteProfile},
    job::{JobStatus, OptionsBag, ScrapeJob, ScrapeOptions, DEFAULT_MAX_RETRIES},
    product::{
        Nutrient, NutrientValue, NutritionFacts, ProductRecord, ScrapeStatus, UNKNOWN_PRODUCT,
    },
};
