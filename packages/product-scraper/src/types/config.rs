//! Configuration types for extraction and crawling.
//!
//! A [`SiteProfile`] captures everything site-specific: which URLs the
//! profile accepts, the fallback strategies per field, the sentinel denylist,
//! and how category pagination is marked up. Profiles are plain data and can
//! be loaded from JSON.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::strategy::LocatorStrategy;

/// Ordered fallback strategies for each product field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStrategies {
    pub name: Vec<LocatorStrategy>,
    pub description: Vec<LocatorStrategy>,
    pub price: Vec<LocatorStrategy>,
    pub ingredients: Vec<LocatorStrategy>,
    pub allergens: Vec<LocatorStrategy>,
    pub nutrition: Vec<LocatorStrategy>,
}

/// How a category listing marks up its pagination control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Container holding the pagination control
    pub container: String,

    /// The "next page" control, searched inside the container
    pub next_button: String,

    /// Page number items, searched inside the container
    pub items: String,

    /// Attribute marking the current page item
    pub current_attribute: String,

    /// Value of `current_attribute` on the current item
    pub current_value: String,

    /// Query string selecting a page; `{page}` is replaced by the number
    pub page_query_template: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            container: r#"div[class*="Pagination_pagination__"]"#.into(),
            next_button: r#"button[class*="Pagination_pagination__arrow_side_right"]"#.into(),
            items: r#"li[class*="PaginationItem_paginationItem__"]"#.into(),
            current_attribute: "aria-current".into(),
            current_value: "page".into(),
            page_query_template: "filters=%7B%22page%22%3A{page}%7D".into(),
        }
    }
}

impl PaginationConfig {
    /// Query string for a page number.
    pub fn page_query(&self, page: u32) -> String {
        self.page_query_template.replace("{page}", &page.to_string())
    }
}

/// Everything site-specific the extractor and crawler need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Profile identifier for logs
    pub name: String,

    /// Origin used to resolve relative product links
    pub origin: String,

    /// Accepted hosts end with this suffix
    pub host_suffix: String,

    /// Accepted paths contain this marker
    pub path_marker: String,

    /// Brand stamped on every successful record
    #[serde(default)]
    pub brand: Option<String>,

    pub fields: FieldStrategies,

    /// Values that look like content but are not (error page headings)
    #[serde(default)]
    pub sentinels: Vec<String>,

    /// Separators splitting a page title into segments
    #[serde(default)]
    pub title_separators: Vec<String>,

    /// Text removed from title segments before using one as a name
    #[serde(default)]
    pub title_boilerplate: Vec<String>,

    /// Selectors for product links on a category page, tried in order
    pub product_link_selectors: Vec<String>,

    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::trader_joes()
    }
}

impl SiteProfile {
    /// Profile for traderjoes.com product and category pages.
    pub fn trader_joes() -> Self {
        use LocatorStrategy as S;

        let fields = FieldStrategies {
            name: vec![
                S::css(r#"h1[data-testid="product-name"]"#),
                S::css("h1.ProductDetails__title"),
                S::css("h1.ProductDetails__name"),
                S::css(r#"h1[class*="ProductDetails"]"#),
                S::css(r#"h1[class*="product-name"]"#),
                S::css(r#"h1[class*="product-title"]"#),
                S::css(r#"h1[itemprop="name"]"#),
                S::css("h1"),
            ],
            description: vec![
                S::css(r#"div[data-testid="product-description"]"#),
                S::css("div.ProductDetails__description"),
                S::css(r#"div[class*="ProductDetails__description"]"#),
                S::css(r#"div[class*="product-description"]"#),
                S::css(r#"div[itemprop="description"]"#),
                S::css("div.ProductDetails__content"),
                S::css(r#"div[class*="ProductDetails__content"]"#),
            ],
            price: vec![
                S::css(r#"span[data-testid="product-price"]"#),
                S::css("span.product-price"),
                S::attribute(r#"span[itemprop="price"]"#, "content"),
                S::css(r#"span[itemprop="price"]"#),
                S::css(r#"span[class*="ProductPrice_productPrice__price"]"#),
            ],
            ingredients: vec![
                S::css(r#"div[class*="IngredientsSummary"]"#),
                S::css(r#"div[class*="ingredients-summary"]"#),
                S::css(r#"div[class*="ingredients"]"#),
                S::css(r#"div[data-testid="ingredients"]"#),
                S::css(r#"div[itemprop="ingredients"]"#),
                S::text_contains("div", "Ingredients"),
            ],
            allergens: vec![
                S::all_text(r#"ul[class*="IngredientsSummary_ingredientsSummary__allergensList"] li"#),
                S::all_text(r#"ul[class*="allergensList"] li"#),
                S::all_text(r#"div[class*="IngredientsSummary_ingredientsSummary"] ul li"#),
                S::all_text(r#"div[class*="ingredients-summary"] ul li"#),
                S::css(r#"div[class*="allergens"]"#),
                S::css(r#"div[data-testid="allergens"]"#),
                S::css(r#"div[class*="allergen-information"]"#),
                S::text_contains("div", "allergen"),
                S::text_contains("div", "contains"),
            ],
            nutrition: vec![
                S::css(r#"div[data-testid="nutrition-facts"]"#),
                S::css("div.ProductDetails__nutrition"),
                S::css(r#"div[class*="ProductDetails__nutrition"]"#),
                S::css(r#"div[class*="nutrition-facts"]"#),
                S::css(r#"div[itemprop="nutrition"]"#),
                S::text_contains("div.ProductDetails__content", "Nutrition Facts"),
                S::text_contains(r#"div[class*="ProductDetails__content"]"#, "Nutrition Facts"),
                S::css("table.NutritionFacts"),
                S::css(r#"table[class*="NutritionFacts"]"#),
            ],
        };

        Self {
            name: "trader_joes".into(),
            origin: "https://www.traderjoes.com".into(),
            host_suffix: "traderjoes.com".into(),
            path_marker: "/products/".into(),
            brand: Some("Trader Joe's".into()),
            fields,
            sentinels: vec!["Oops!".into()],
            title_separators: vec!["|".into()],
            title_boilerplate: vec!["Trader Joe's".into()],
            product_link_selectors: vec![
                r#"ul[class*="ProductList_productList__list"] a[class*="ProductCard_card__title"]"#
                    .into(),
                r#"a[class*="ProductCard_card__title"]"#.into(),
            ],
            pagination: PaginationConfig::default(),
        }
    }

    /// Parse a profile from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Whether this profile can scrape the URL.
    ///
    /// The host must end with `host_suffix` and the path must contain
    /// `path_marker`, both compared case-insensitively.
    pub fn can_handle(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let suffix = self.host_suffix.to_lowercase();
        let host = host.to_lowercase();
        let host_ok = host == suffix || host.ends_with(&format!(".{suffix}"));

        host_ok
            && parsed
                .path()
                .to_lowercase()
                .contains(&self.path_marker.to_lowercase())
    }

    /// Whether a value is on the sentinel denylist.
    pub fn is_sentinel(&self, value: &str) -> bool {
        let value = value.trim();
        self.sentinels
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(value))
    }
}

/// Settings for the extractor itself, independent of the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Version stamped on every record
    pub extractor_version: String,

    /// Ask the page to reach network idle before reading fields
    pub wait_for_network_idle: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            extractor_version: env!("CARGO_PKG_VERSION").to_string(),
            wait_for_network_idle: true,
        }
    }
}

impl ExtractorConfig {
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.extractor_version = version.into();
        self
    }

    pub fn with_wait_for_network_idle(mut self, wait: bool) -> Self {
        self.wait_for_network_idle = wait;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_handle() {
        let profile = SiteProfile::trader_joes();

        assert!(profile.can_handle("https://www.traderjoes.com/home/products/pdp/bread-123"));
        assert!(profile.can_handle("https://TRADERJOES.com/home/Products/pdp/x"));
        assert!(!profile.can_handle("https://www.traderjoes.com/home/recipes/x"));
        assert!(!profile.can_handle("https://nottraderjoes.com/home/products/x"));
        assert!(!profile.can_handle("https://example.com/products/traderjoes.com"));
        assert!(!profile.can_handle("not a url"));
    }

    #[test]
    fn test_sentinels() {
        let profile = SiteProfile::trader_joes();
        assert!(profile.is_sentinel("  oops! "));
        assert!(!profile.is_sentinel("Oops! All Berries"));
    }

    #[test]
    fn test_page_query() {
        let pagination = PaginationConfig::default();
        assert_eq!(pagination.page_query(3), "filters=%7B%22page%22%3A3%7D");
    }

    #[test]
    fn test_profile_json_round_trip() {
        let profile = SiteProfile::trader_joes();
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(SiteProfile::from_json(&json).unwrap(), profile);
    }

    #[test]
    fn test_minimal_profile_json_uses_defaults() {
        let json = r#"{
            "name": "shop",
            "origin": "https://shop.example.com",
            "host_suffix": "shop.example.com",
            "path_marker": "/p/",
            "fields": {
                "name": [{"type": "css", "selector": "h1"}],
                "description": [],
                "price": [],
                "ingredients": [],
                "allergens": [],
                "nutrition": []
            },
            "product_link_selectors": ["a.product"]
        }"#;

        let profile = SiteProfile::from_json(json).unwrap();
        assert_eq!(profile.brand, None);
        assert!(profile.sentinels.is_empty());
        assert_eq!(profile.pagination, PaginationConfig::default());
        assert!(profile.can_handle("https://shop.example.com/p/1"));
    }
}
