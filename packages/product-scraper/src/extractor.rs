//! Selector-fallback product extractor.
//!
//! For every field the site profile lists strategies in order; the first
//! one producing a non-empty, non-sentinel value that also parses wins.
//! Text interpretation is delegated to [`crate::parsers`].
//!
//! `scrape` never returns an error. Load failures, wait failures and panics
//! inside field extraction all become a `failed` record that still carries
//! whatever name could be read off the page.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::error::RenderResult;
use crate::parsers::{
    parse_allergen_list, parse_allergens, parse_ingredients, parse_nutrition_from_table,
    parse_nutrition_from_text, parse_price,
};
use crate::strategy::{try_extract, LocatorStrategy};
use crate::traits::renderer::{Element, Page, PageRenderer};
use crate::types::config::{ExtractorConfig, SiteProfile};
use crate::types::job::ScrapeOptions;
use crate::types::product::{NutritionFacts, ProductRecord, UNKNOWN_PRODUCT};
use crate::urls::resolve_href;

/// Turns loaded pages into product records.
#[derive(Debug, Clone)]
pub struct Extractor {
    profile: SiteProfile,
    config: ExtractorConfig,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(SiteProfile::default())
    }
}

impl Extractor {
    pub fn new(profile: SiteProfile) -> Self {
        Self {
            profile,
            config: ExtractorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    pub fn version(&self) -> &str {
        &self.config.extractor_version
    }

    /// Load a URL and extract a record from it.
    ///
    /// `source_url` of the result is the requested URL, not the page's
    /// resolved URL after redirects.
    #[instrument(skip(self, renderer, options), fields(renderer = renderer.name()))]
    pub async fn scrape<R: PageRenderer>(
        &self,
        renderer: &R,
        url: &str,
        options: &ScrapeOptions,
    ) -> ProductRecord {
        let started = Instant::now();

        let page = match renderer.load_page(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to load product page");
                return ProductRecord::new(url, self.version())
                    .failed(e.to_string(), started.elapsed().as_secs_f64());
            }
        };

        self.extract_from(&page, url, options, started).await
    }

    /// Extract a record from an already loaded page.
    pub async fn extract<P: Page>(&self, page: &P, options: &ScrapeOptions) -> ProductRecord {
        self.extract_from(page, page.url(), options, Instant::now())
            .await
    }

    async fn extract_from<P: Page>(
        &self,
        page: &P,
        source_url: &str,
        options: &ScrapeOptions,
        started: Instant,
    ) -> ProductRecord {
        let outcome = AssertUnwindSafe(self.extract_fields(page, source_url, options))
            .catch_unwind()
            .await;

        let fault = match outcome {
            Ok(Ok(record)) => {
                let record = record.succeeded(started.elapsed().as_secs_f64());
                info!(
                    url = %source_url,
                    name = %record.name,
                    ingredients = record.ingredients.len(),
                    duration_secs = record.scrape_duration_seconds,
                    "Extracted product"
                );
                return record;
            }
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic),
        };

        warn!(url = %source_url, error = %fault, "Extraction failed");

        // Secondary faults while salvaging the name are ignored.
        let name = AssertUnwindSafe(self.extract_name(page))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| UNKNOWN_PRODUCT.to_string());

        ProductRecord::new(source_url, self.version())
            .with_name(name)
            .failed(fault, started.elapsed().as_secs_f64())
    }

    async fn extract_fields<P: Page>(
        &self,
        page: &P,
        source_url: &str,
        options: &ScrapeOptions,
    ) -> RenderResult<ProductRecord> {
        if self.config.wait_for_network_idle {
            page.wait_for_network_idle().await?;
        }

        let fields = &self.profile.fields;
        let name = self.extract_name(page).await;
        let description = self
            .first_match(page, "description", &fields.description, |_, text| {
                Some(text.to_string())
            })
            .await;
        let price = self
            .first_match(page, "price", &fields.price, |_, text| parse_price(text))
            .await;
        let ingredients = self
            .first_match(page, "ingredients", &fields.ingredients, |_, text| {
                let parsed = parse_ingredients(&text.replace("Ingredients:", ""));
                (!parsed.is_empty()).then_some(parsed)
            })
            .await
            .unwrap_or_default();
        let allergens = self
            .first_match(page, "allergens", &fields.allergens, |strategy, text| {
                parse_allergens(text).or_else(|| {
                    if strategy.is_list() {
                        parse_allergen_list(text)
                    } else {
                        None
                    }
                })
            })
            .await;
        let nutrition_facts = if options.include_nutrition {
            self.extract_nutrition(page).await
        } else {
            None
        };

        Ok(ProductRecord::new(source_url, self.version())
            .with_name(name)
            .with_brand(self.profile.brand.clone())
            .with_description(description)
            .with_price(price)
            .with_ingredients(ingredients)
            .with_allergens(allergens)
            .with_nutrition_facts(nutrition_facts))
    }

    /// First strategy whose text is not a sentinel and parses.
    async fn first_match<P, T>(
        &self,
        page: &P,
        field: &str,
        strategies: &[LocatorStrategy],
        parse: fn(&LocatorStrategy, &str) -> Option<T>,
    ) -> Option<T>
    where
        P: Page,
        T: Send,
    {
        for strategy in strategies {
            let Some(text) = try_extract(strategy, page).await else {
                continue;
            };
            if self.profile.is_sentinel(&text) {
                debug!(field, selector = strategy.selector(), "Skipping sentinel value");
                continue;
            }
            if let Some(value) = parse(strategy, &text) {
                debug!(field, selector = strategy.selector(), "Field matched");
                return Some(value);
            }
        }
        None
    }

    /// Product name with title and sentinel fallbacks. Never empty.
    pub async fn extract_name<P: Page>(&self, page: &P) -> String {
        let from_strategies = self
            .first_match(page, "name", &self.profile.fields.name, |_, text| {
                Some(text.to_string())
            })
            .await;
        if let Some(name) = from_strategies {
            return name;
        }

        match page.title().await {
            Ok(Some(title)) => {
                if let Some(name) = self.name_from_title(&title) {
                    debug!(title = %title, "Using page title as product name");
                    return name;
                }
            }
            Ok(None) => {}
            Err(e) => debug!(error = %e, "Failed to read page title"),
        }

        warn!(url = %page.url(), "Could not find product name");
        UNKNOWN_PRODUCT.to_string()
    }

    /// First title segment left after stripping boilerplate.
    pub fn name_from_title(&self, title: &str) -> Option<String> {
        let mut segments = vec![title.to_string()];
        for separator in &self.profile.title_separators {
            segments = segments
                .iter()
                .flat_map(|s| s.split(separator.as_str()).map(str::to_string))
                .collect();
        }

        segments.into_iter().find_map(|segment| {
            let cleaned = self
                .profile
                .title_boilerplate
                .iter()
                .fold(segment, |acc, boilerplate| acc.replace(boilerplate.as_str(), ""));
            let cleaned = cleaned.trim();
            (!cleaned.is_empty() && !self.profile.is_sentinel(cleaned)).then(|| cleaned.to_string())
        })
    }

    async fn extract_nutrition<P: Page>(&self, page: &P) -> Option<NutritionFacts> {
        for strategy in &self.profile.fields.nutrition {
            let element = match strategy.locate(page).await {
                Ok(Some(element)) => element,
                Ok(None) => continue,
                Err(e) => {
                    debug!(selector = strategy.selector(), error = %e, "Nutrition strategy failed");
                    continue;
                }
            };

            if let Ok(Some(text)) = element.text_content().await {
                if let Some(facts) = parse_nutrition_from_text(&text) {
                    return Some(facts);
                }
            }

            match table_rows(&element).await {
                Ok(rows) => {
                    if let Some(facts) = parse_nutrition_from_table(&rows) {
                        return Some(facts);
                    }
                }
                Err(e) => debug!(error = %e, "Failed to read nutrition table"),
            }
        }
        None
    }

    /// Absolute product URLs on a category page.
    ///
    /// Selectors are tried in order; the first one yielding links wins.
    pub async fn extract_product_links<P: Page>(&self, page: &P) -> Vec<String> {
        for selector in &self.profile.product_link_selectors {
            let anchors = match page.query_all(selector).await {
                Ok(anchors) => anchors,
                Err(e) => {
                    debug!(selector = %selector, error = %e, "Link selector failed");
                    continue;
                }
            };

            let mut links = Vec::with_capacity(anchors.len());
            for anchor in &anchors {
                if let Ok(Some(href)) = anchor.attribute("href").await {
                    if let Some(url) = resolve_href(&self.profile.origin, &href) {
                        links.push(url);
                    }
                }
            }

            if !links.is_empty() {
                debug!(selector = %selector, count = links.len(), "Found product links");
                return links;
            }
        }
        Vec::new()
    }
}

/// `(label, value)` pairs from rows with at least two cells.
async fn table_rows<E: Element>(table: &E) -> RenderResult<Vec<(String, String)>> {
    let mut rows = Vec::new();
    for row in table.query_all("tr").await? {
        let cells = row.query_all("td, th").await?;
        if cells.len() < 2 {
            continue;
        }
        let label = cells[0].text_content().await?.unwrap_or_default();
        let value = cells[1].text_content().await?.unwrap_or_default();
        rows.push((label.trim().to_string(), value.trim().to_string()));
    }
    Ok(rows)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "extraction panicked".to_string()
    }
}
