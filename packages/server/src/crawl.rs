//! Category crawl request and report, shared by `POST /crawl` and the
//! `crawl_category` binary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CrawlRequest {
    pub url: String,

    /// Stop after this many listing pages
    #[serde(default)]
    pub max_pages: Option<u32>,
}

/// Discovered product URLs of one category crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub scraped_at: DateTime<Utc>,
    pub total_urls: usize,
    pub urls: Vec<String>,
}

impl CrawlReport {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            scraped_at: Utc::now(),
            total_urls: urls.len(),
            urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_urls() {
        let report = CrawlReport::new(vec!["https://a/1".into(), "https://a/2".into()]);
        assert_eq!(report.total_urls, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_urls"], 2);
        assert!(json["scraped_at"].is_string());
    }

    #[test]
    fn test_request_page_cap_is_optional() {
        let request: CrawlRequest = serde_json::from_str(r#"{"url": "https://a"}"#).unwrap();
        assert_eq!(request.max_pages, None);
    }
}
