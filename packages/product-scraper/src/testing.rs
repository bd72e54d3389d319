//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the scraper without
//! making network calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::error::{RenderError, RenderResult, StoreError, StoreResult};
use crate::renderers::html::{HtmlElement, HtmlPage};
use crate::stores::MemoryStore;
use crate::traits::renderer::{Page, PageRenderer};
use crate::traits::store::ProductStore;
use crate::types::{job::ScrapeJob, product::ProductRecord};

type PageGenerator = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A mock renderer serving canned HTML.
///
/// Pages are looked up by exact URL first, then produced by the generator
/// if one is set. URLs registered with `with_failure` time out.
#[derive(Clone, Default)]
pub struct MockRenderer {
    pages: HashMap<String, String>,
    generator: Option<PageGenerator>,
    failures: HashSet<String>,
    wait_failures: HashSet<String>,
    panics: HashSet<String>,

    /// Call tracking for assertions
    loads: Arc<RwLock<Vec<String>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Produce pages on demand, e.g. an unbounded category sequence.
    pub fn with_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Loading `url` fails with a timeout.
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failures.insert(url.into());
        self
    }

    /// The page at `url` loads but never reaches network idle.
    pub fn with_wait_failure(mut self, url: impl Into<String>) -> Self {
        self.wait_failures.insert(url.into());
        self
    }

    /// Element queries on the page at `url` panic.
    pub fn with_panic(mut self, url: impl Into<String>) -> Self {
        self.panics.insert(url.into());
        self
    }

    /// URLs passed to `load_page`, in call order.
    pub fn loads(&self) -> Vec<String> {
        self.loads.read().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.read().unwrap().len()
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    type Page = MockPage;

    async fn load_page(&self, url: &str) -> RenderResult<MockPage> {
        self.loads.write().unwrap().push(url.to_string());

        if self.failures.contains(url) {
            return Err(RenderError::Timeout { url: url.to_string() });
        }

        let html = self
            .pages
            .get(url)
            .cloned()
            .or_else(|| self.generator.as_ref().and_then(|g| g(url)))
            .ok_or_else(|| RenderError::Navigation {
                url: url.to_string(),
                reason: "no mock page registered".into(),
            })?;

        Ok(MockPage {
            inner: HtmlPage::new(url, html),
            fail_wait: self.wait_failures.contains(url),
            panic_on_query: self.panics.contains(url),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Page handle returned by [`MockRenderer`].
pub struct MockPage {
    inner: HtmlPage,
    fail_wait: bool,
    panic_on_query: bool,
}

#[async_trait]
impl Page for MockPage {
    type Element = HtmlElement;

    fn url(&self) -> &str {
        self.inner.url()
    }

    async fn title(&self) -> RenderResult<Option<String>> {
        if self.panic_on_query {
            panic!("mock renderer crashed reading title");
        }
        self.inner.title().await
    }

    async fn query_all(&self, selector: &str) -> RenderResult<Vec<HtmlElement>> {
        if self.panic_on_query {
            panic!("mock renderer crashed on {selector}");
        }
        self.inner.query_all(selector).await
    }

    async fn wait_for_network_idle(&self) -> RenderResult<()> {
        if self.fail_wait {
            return Err(RenderError::Timeout {
                url: self.inner.url().to_string(),
            });
        }
        Ok(())
    }
}

/// A store whose writes can be switched to fail.
///
/// Reads and unaffected writes go to an inner [`MemoryStore`].
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_product_writes: AtomicBool,
    fail_job_updates: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_product_writes(&self, fail: bool) {
        self.fail_product_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_job_updates(&self, fail: bool) {
        self.fail_job_updates.store(fail, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl ProductStore for FailingStore {
    async fn put_product(&self, record: &ProductRecord) -> StoreResult<()> {
        if self.fail_product_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("product write rejected".into()));
        }
        self.inner.put_product(record).await
    }

    async fn get_product_by_url(&self, url: &str) -> StoreResult<Option<ProductRecord>> {
        self.inner.get_product_by_url(url).await
    }

    async fn get_product_by_id(&self, id: Uuid) -> StoreResult<Option<ProductRecord>> {
        self.inner.get_product_by_id(id).await
    }

    async fn put_job(&self, job: &ScrapeJob) -> StoreResult<()> {
        self.inner.put_job(job).await
    }

    async fn update_job(&self, job: &ScrapeJob) -> StoreResult<()> {
        if self.fail_job_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("job update rejected".into()));
        }
        self.inner.update_job(job).await
    }

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<ScrapeJob>> {
        self.inner.get_job(job_id).await
    }

    async fn delete_jobs_older_than(&self, age: chrono::Duration) -> StoreResult<usize> {
        self.inner.delete_jobs_older_than(age).await
    }
}

/// Product detail page markup in the shape the default profile expects.
pub fn product_page_html(name: &str, ingredients: &str) -> String {
    format!(
        r#"<html><head><title>{name} | Trader Joe's</title></head><body>
<h1 class="ProductDetails_main__title__14Cnm">{name}</h1>
<span class="ProductPrice_productPrice__price__3-50j">$2.99</span>
<div class="IngredientsSummary_ingredientsSummary__ingredients__1x">Ingredients: {ingredients}</div>
</body></html>"#
    )
}

/// Category listing markup with product links and a pagination control.
///
/// `current` is the text of the item marked as the current page; `None`
/// leaves every item unmarked.
pub fn category_page_html(links: &[&str], current: Option<&str>, next_enabled: bool) -> String {
    let cards: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<li><article><a class="ProductCard_card__title__301RA" href="{href}">Product</a></article></li>"#
            )
        })
        .collect();

    let current_item = current
        .map(|text| {
            format!(
                r#"<li class="PaginationItem_paginationItem__2f87h" aria-current="page">page {text}</li>"#
            )
        })
        .unwrap_or_default();

    let disabled = if next_enabled { "" } else { " disabled" };

    format!(
        r#"<html><body>
<ul class="ProductList_productList__list__3-dGs">{cards}</ul>
<div class="Pagination_pagination__1ixgp">
  <button class="Pagination_pagination__arrow__3TJf0 Pagination_pagination__arrow_side_left__9YUGr">prev</button>
  <ul>
    <li class="PaginationItem_paginationItem__2f87h">page x</li>
    {current_item}
  </ul>
  <button class="Pagination_pagination__arrow__3TJf0 Pagination_pagination__arrow_side_right__9YUGr"{disabled}>next</button>
</div>
</body></html>"#
    )
}
