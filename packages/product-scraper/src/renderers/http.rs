//! HTTP renderer for server-rendered pages.
//!
//! No JavaScript rendering; pages that build their DOM client-side come back
//! without the content the field strategies look for.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::html::HtmlPage;
use crate::error::{RenderError, RenderResult};
use crate::traits::renderer::PageRenderer;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for [`HttpRenderer`].
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Per-load timeout
    pub timeout: Duration,

    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RendererConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Loads pages with a plain HTTP GET.
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| RenderError::Http(Box::new(e)))?;

        Ok(Self { client })
    }
}

fn classify(url: &str, error: reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout { url: url.to_string() }
    } else if error.is_connect() || error.is_redirect() || error.is_builder() {
        RenderError::Navigation {
            url: url.to_string(),
            reason: error.to_string(),
        }
    } else {
        RenderError::Http(Box::new(error))
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    type Page = HtmlPage;

    async fn load_page(&self, url: &str) -> RenderResult<HtmlPage> {
        debug!(url = %url, "Fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(HtmlPage::new(final_url, body))
    }

    fn name(&self) -> &str {
        "http"
    }
}
