//! Rendering capability consumed by the extractor and crawler.
//!
//! The core never drives a browser itself. It asks a `PageRenderer` to load
//! a URL and then reads the resulting `Page` through a handful of DOM
//! queries. Timeouts are the renderer's responsibility: a load that takes
//! too long comes back as `RenderError::Timeout`.
//!
//! # Usage
//!
//! ```rust,ignore
//! let page = renderer.load_page("https://www.traderjoes.com/home/products/pdp/x").await?;
//! page.wait_for_network_idle().await?;
//! if let Some(h1) = page.query("h1").await? {
//!     println!("{:?}", h1.text_content().await?);
//! }
//! ```

use async_trait::async_trait;

use crate::error::RenderResult;

/// A located element on a rendered page.
#[async_trait]
pub trait Element: Send + Sync + Sized {
    /// Text content of the element and its descendants.
    async fn text_content(&self) -> RenderResult<Option<String>>;

    /// Value of an attribute, if present.
    async fn attribute(&self, name: &str) -> RenderResult<Option<String>>;

    /// All descendants matching a selector, in document order.
    async fn query_all(&self, selector: &str) -> RenderResult<Vec<Self>>;
}

/// A loaded page handle.
#[async_trait]
pub trait Page: Send + Sync {
    type Element: Element + 'static;

    /// Current resolved URL (after redirects).
    fn url(&self) -> &str;

    /// Document title, if any.
    async fn title(&self) -> RenderResult<Option<String>>;

    /// All elements matching a selector, in document order.
    async fn query_all(&self, selector: &str) -> RenderResult<Vec<Self::Element>>;

    /// First element matching a selector.
    async fn query(&self, selector: &str) -> RenderResult<Option<Self::Element>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    /// Wait until the page stops issuing network requests.
    async fn wait_for_network_idle(&self) -> RenderResult<()>;
}

/// Loads pages.
///
/// Implementations:
/// - `HttpRenderer` - fetches server-rendered HTML over HTTP
/// - `MockRenderer` - canned pages for tests
#[async_trait]
pub trait PageRenderer: Send + Sync {
    type Page: Page + 'static;

    /// Navigate to a URL and return the loaded page.
    async fn load_page(&self, url: &str) -> RenderResult<Self::Page>;

    /// Get the renderer name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
