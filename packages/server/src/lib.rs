// Scrape Server
//
// HTTP surface over the product scraper: submit scrape jobs, query job and
// product state, crawl category listings. Jobs live in the in-memory store
// and are swept periodically by the housekeeping task.

pub mod config;
pub mod crawl;
pub mod housekeeping;
pub mod server;

pub use config::*;
