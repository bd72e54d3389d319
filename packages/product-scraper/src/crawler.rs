//! Pagination crawler for category listings.
//!
//! Category pages expose no page count. The crawler reads the pagination
//! control on each page: an enabled "next" control plus a current-page item
//! whose number can be parsed means there is another page, and its URL is
//! built from the page's own URL and the profile's page query. Anything
//! else ends the crawl.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::RenderResult;
use crate::extractor::Extractor;
use crate::traits::renderer::{Element, Page, PageRenderer};
use crate::types::config::PaginationConfig;

/// Where the crawl goes after the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// No pagination control, or its "next" control is missing or disabled
    Last,

    /// The current-page item's text is not a page number; the page's
    /// links are discarded
    UnparsablePageNumber(String),

    /// Pagination exists but the next page cannot be determined
    Unresolvable(String),

    /// The next page's number and URL
    Page { number: u32, url: String },
}

/// Parse a page number out of a pagination item's text.
///
/// Drops the word "page" and any surrounding decoration, so "page 3",
/// "3" and "(3)" all yield 3.
pub fn parse_page_number(text: &str) -> Option<u32> {
    let lowered = text.to_lowercase().replace("page", "");
    lowered
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .parse()
        .ok()
}

/// Base URL with the query replaced by the page query.
pub fn next_page_url(current_url: &str, pagination: &PaginationConfig, page: u32) -> String {
    let base = current_url.split('?').next().unwrap_or(current_url);
    format!("{base}?{}", pagination.page_query(page))
}

/// Crawls a category's pages and collects product URLs.
#[derive(Debug, Clone)]
pub struct PaginationCrawler {
    extractor: Arc<Extractor>,
}

impl PaginationCrawler {
    pub fn new(extractor: Arc<Extractor>) -> Self {
        Self { extractor }
    }

    /// Product URLs across the category's pages, duplicates kept.
    ///
    /// Stops after `page_cap` page loads when set. A load or wait fault
    /// returns what was collected so far. A page whose current-page number
    /// cannot be parsed contributes no links; any other dead end keeps the
    /// page's links and stops.
    #[instrument(skip(self, renderer), fields(renderer = renderer.name()))]
    pub async fn crawl_category<R: PageRenderer>(
        &self,
        renderer: &R,
        start_url: &str,
        page_cap: Option<u32>,
    ) -> Vec<String> {
        let mut urls = Vec::new();
        let mut current_url = start_url.to_string();
        let mut page_number: u32 = 1;

        loop {
            if page_cap.is_some_and(|cap| page_number > cap) {
                info!(page_cap = ?page_cap, "Reached page limit");
                break;
            }

            info!(page = page_number, url = %current_url, "Crawling category page");

            let page = match renderer.load_page(&current_url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(url = %current_url, error = %e, "Failed to load category page");
                    break;
                }
            };
            if let Err(e) = page.wait_for_network_idle().await {
                warn!(url = %current_url, error = %e, "Category page never settled");
                break;
            }

            let links = self.extractor.extract_product_links(&page).await;
            debug!(page = page_number, count = links.len(), "Collected product links");

            match self.next_page(&page).await {
                NextPage::Last => {
                    urls.extend(links);
                    info!("No more pages");
                    break;
                }
                NextPage::UnparsablePageNumber(text) => {
                    warn!(
                        page = page_number,
                        text = %text,
                        dropped = links.len(),
                        "Unparsable page number, discarding page"
                    );
                    break;
                }
                NextPage::Unresolvable(reason) => {
                    urls.extend(links);
                    warn!(page = page_number, reason = %reason, "Cannot determine next page");
                    break;
                }
                NextPage::Page { number, url } => {
                    urls.extend(links);
                    if url == current_url {
                        warn!(url = %url, "Next page points back at the current page");
                        break;
                    }
                    debug!(next = number, url = %url, "Found next page");
                    current_url = url;
                    page_number += 1;
                }
            }
        }

        info!(total = urls.len(), pages = page_number, "Category crawl finished");
        urls
    }

    /// Inspect a loaded page's pagination control.
    pub async fn next_page<P: Page>(&self, page: &P) -> NextPage {
        match self.resolve_next_page(page).await {
            Ok(next) => next,
            Err(e) => NextPage::Unresolvable(e.to_string()),
        }
    }

    async fn resolve_next_page<P: Page>(&self, page: &P) -> RenderResult<NextPage> {
        let pagination = &self.extractor.profile().pagination;

        let Some(container) = page.query(&pagination.container).await? else {
            return Ok(NextPage::Last);
        };

        let Some(next) = container
            .query_all(&pagination.next_button)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(NextPage::Last);
        };
        if is_disabled(&next).await? {
            return Ok(NextPage::Last);
        }

        let mut current_text = None;
        for item in container.query_all(&pagination.items).await? {
            if is_current(&item, pagination).await? {
                current_text = item.text_content().await?;
                break;
            }
        }
        let Some(text) = current_text else {
            return Ok(NextPage::Unresolvable("no current page item".into()));
        };

        let Some(current) = parse_page_number(&text) else {
            return Ok(NextPage::UnparsablePageNumber(text.trim().to_string()));
        };
        let Some(number) = current.checked_add(1) else {
            return Ok(NextPage::Unresolvable("page number overflow".into()));
        };

        Ok(NextPage::Page {
            number,
            url: next_page_url(page.url(), pagination, number),
        })
    }
}

async fn is_disabled<E: Element>(button: &E) -> RenderResult<bool> {
    if button.attribute("disabled").await?.is_some() {
        return Ok(true);
    }
    Ok(button
        .attribute("aria-disabled")
        .await?
        .is_some_and(|v| v.eq_ignore_ascii_case("true")))
}

/// The marker sits on the item itself or on a link inside it.
async fn is_current<E: Element>(item: &E, pagination: &PaginationConfig) -> RenderResult<bool> {
    if item.attribute(&pagination.current_attribute).await?.as_deref()
        == Some(pagination.current_value.as_str())
    {
        return Ok(true);
    }
    let nested = format!(
        r#"[{}="{}"]"#,
        pagination.current_attribute, pagination.current_value
    );
    Ok(!item.query_all(&nested).await?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::html::HtmlPage;
    use crate::testing::{category_page_html, MockRenderer};

    const START: &str = "https://www.traderjoes.com/home/products/category/cookies-1";

    fn crawler() -> PaginationCrawler {
        PaginationCrawler::new(Arc::new(Extractor::default()))
    }

    fn page_url(n: u32) -> String {
        next_page_url(START, &PaginationConfig::default(), n)
    }

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number("3"), Some(3));
        assert_eq!(parse_page_number(" Page 12 "), Some(12));
        assert_eq!(parse_page_number("(4)"), Some(4));
        assert_eq!(parse_page_number("page"), None);
        assert_eq!(parse_page_number("three"), None);
    }

    #[test]
    fn test_next_page_url_strips_query() {
        let pagination = PaginationConfig::default();
        assert_eq!(
            next_page_url("https://x.com/c?filters=old&y=1", &pagination, 2),
            "https://x.com/c?filters=%7B%22page%22%3A2%7D"
        );
    }

    #[tokio::test]
    async fn test_next_page_states() {
        let crawler = crawler();

        let last = HtmlPage::new(START, category_page_html(&["/a"], Some("3"), false));
        assert_eq!(crawler.next_page(&last).await, NextPage::Last);

        let no_pagination = HtmlPage::new(START, "<ul></ul>");
        assert_eq!(crawler.next_page(&no_pagination).await, NextPage::Last);

        let middle = HtmlPage::new(START, category_page_html(&["/a"], Some("2"), true));
        assert_eq!(
            crawler.next_page(&middle).await,
            NextPage::Page {
                number: 3,
                url: page_url(3)
            }
        );

        let broken = HtmlPage::new(START, category_page_html(&["/a"], Some("…"), true));
        assert_eq!(
            crawler.next_page(&broken).await,
            NextPage::UnparsablePageNumber("page …".into())
        );

        let no_current = HtmlPage::new(START, category_page_html(&["/a"], None, true));
        assert!(matches!(
            crawler.next_page(&no_current).await,
            NextPage::Unresolvable(_)
        ));
    }

    #[tokio::test]
    async fn test_crawls_until_last_page() {
        let renderer = MockRenderer::new()
            .with_page(START, category_page_html(&["/p/1", "/p/2"], Some("1"), true))
            .with_page(page_url(2), category_page_html(&["/p/3"], Some("2"), true))
            .with_page(page_url(3), category_page_html(&["/p/4", "/p/1"], Some("3"), false));

        let urls = crawler().crawl_category(&renderer, START, None).await;

        assert_eq!(
            urls,
            vec![
                "https://www.traderjoes.com/p/1",
                "https://www.traderjoes.com/p/2",
                "https://www.traderjoes.com/p/3",
                "https://www.traderjoes.com/p/4",
                "https://www.traderjoes.com/p/1",
            ]
        );
        assert_eq!(renderer.load_count(), 3);
    }

    #[tokio::test]
    async fn test_unparsable_indicator_drops_that_page() {
        let renderer = MockRenderer::new()
            .with_page(START, category_page_html(&["/p/1"], Some("1"), true))
            .with_page(page_url(2), category_page_html(&["/p/2"], Some("2"), true))
            .with_page(page_url(3), category_page_html(&["/p/3"], Some("?!"), true));

        let urls = crawler().crawl_category(&renderer, START, None).await;

        assert_eq!(
            urls,
            vec!["https://www.traderjoes.com/p/1", "https://www.traderjoes.com/p/2"]
        );
    }

    #[tokio::test]
    async fn test_missing_current_marker_keeps_links() {
        let renderer = MockRenderer::new()
            .with_page(START, category_page_html(&["/p/1", "/p/2"], None, true));

        let urls = crawler().crawl_category(&renderer, START, None).await;

        assert_eq!(
            urls,
            vec!["https://www.traderjoes.com/p/1", "https://www.traderjoes.com/p/2"]
        );
        assert_eq!(renderer.load_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_current_marker_after_first_page_keeps_all_links() {
        let renderer = MockRenderer::new()
            .with_page(START, category_page_html(&["/p/1"], Some("1"), true))
            .with_page(page_url(2), category_page_html(&["/p/2"], None, true));

        let urls = crawler().crawl_category(&renderer, START, None).await;

        assert_eq!(
            urls,
            vec!["https://www.traderjoes.com/p/1", "https://www.traderjoes.com/p/2"]
        );
    }

    #[tokio::test]
    async fn test_page_cap_bounds_loads() {
        let renderer = MockRenderer::new().with_generator(|url| {
            let n = url
                .split("%3A")
                .nth(1)
                .and_then(|rest| rest.trim_end_matches("%7D").parse::<u32>().ok())
                .unwrap_or(1);
            Some(category_page_html(
                &[format!("/p/{n}").as_str()],
                Some(n.to_string().as_str()),
                true,
            ))
        });

        let urls = crawler().crawl_category(&renderer, START, Some(2)).await;

        assert_eq!(renderer.load_count(), 2);
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_load_fault_returns_partial() {
        let renderer = MockRenderer::new()
            .with_page(START, category_page_html(&["/p/1"], Some("1"), true))
            .with_failure(page_url(2));

        let urls = crawler().crawl_category(&renderer, START, None).await;
        assert_eq!(urls, vec!["https://www.traderjoes.com/p/1"]);
    }

    #[tokio::test]
    async fn test_zero_cap_loads_nothing() {
        let renderer = MockRenderer::new();
        let urls = crawler().crawl_category(&renderer, START, Some(0)).await;
        assert!(urls.is_empty());
        assert_eq!(renderer.load_count(), 0);
    }
}
