//! Locator strategies: the unit of the per-field fallback lists.
//!
//! A field is configured as an ordered list of strategies. Each strategy
//! either yields a trimmed, non-empty string or nothing; faults raised while
//! evaluating a strategy are logged and treated as "nothing" so the next
//! strategy gets its turn.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenderResult;
use crate::traits::renderer::{Element, Page};

/// How to find a field's text on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocatorStrategy {
    /// Text of the first element matching a CSS selector
    Css { selector: String },

    /// An attribute of the first element matching a selector
    Attribute { selector: String, attribute: String },

    /// Innermost element matching a selector whose text contains `needle`
    /// (case-insensitive)
    TextContains { selector: String, needle: String },

    /// Texts of every element matching a selector, joined with ", "
    AllText { selector: String },
}

impl LocatorStrategy {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    pub fn attribute(selector: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::Attribute {
            selector: selector.into(),
            attribute: attribute.into(),
        }
    }

    pub fn text_contains(selector: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::TextContains {
            selector: selector.into(),
            needle: needle.into(),
        }
    }

    pub fn all_text(selector: impl Into<String>) -> Self {
        Self::AllText {
            selector: selector.into(),
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Self::Css { selector }
            | Self::Attribute { selector, .. }
            | Self::TextContains { selector, .. }
            | Self::AllText { selector } => selector,
        }
    }

    /// Whether the strategy collects several elements into one list.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::AllText { .. })
    }

    /// The element this strategy points at, for fields that need structure
    /// beyond text (nutrition tables).
    pub async fn locate<P: Page>(&self, page: &P) -> RenderResult<Option<P::Element>> {
        match self {
            Self::Css { selector } | Self::Attribute { selector, .. } | Self::AllText { selector } => {
                page.query(selector).await
            }
            Self::TextContains { selector, needle } => {
                Ok(innermost_containing(page, selector, needle).await?.map(|(el, _)| el))
            }
        }
    }

    async fn evaluate<P: Page>(&self, page: &P) -> RenderResult<Option<String>> {
        match self {
            Self::Css { selector } => match page.query(selector).await? {
                Some(el) => Ok(el.text_content().await?),
                None => Ok(None),
            },
            Self::Attribute { selector, attribute } => match page.query(selector).await? {
                Some(el) => Ok(el.attribute(attribute).await?),
                None => Ok(None),
            },
            Self::TextContains { selector, needle } => {
                Ok(innermost_containing(page, selector, needle).await?.map(|(_, text)| text))
            }
            Self::AllText { selector } => {
                let mut parts = Vec::new();
                for el in page.query_all(selector).await? {
                    if let Some(text) = el.text_content().await? {
                        let text = text.trim();
                        if !text.is_empty() {
                            parts.push(text.to_string());
                        }
                    }
                }
                Ok((!parts.is_empty()).then(|| parts.join(", ")))
            }
        }
    }
}

async fn innermost_containing<P: Page>(
    page: &P,
    selector: &str,
    needle: &str,
) -> RenderResult<Option<(P::Element, String)>> {
    let needle = needle.to_lowercase();
    let mut best: Option<(P::Element, String)> = None;
    for el in page.query_all(selector).await? {
        let Some(text) = el.text_content().await? else {
            continue;
        };
        if !text.to_lowercase().contains(&needle) {
            continue;
        }
        let shorter = best.as_ref().map_or(true, |(_, b)| text.len() < b.len());
        if shorter {
            best = Some((el, text));
        }
    }
    Ok(best)
}

/// Evaluate one strategy, returning its trimmed non-empty text.
///
/// Faults are swallowed; a failing strategy is the same as a missing one.
pub async fn try_extract<P: Page>(strategy: &LocatorStrategy, page: &P) -> Option<String> {
    match strategy.evaluate(page).await {
        Ok(Some(text)) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Ok(None) => None,
        Err(e) => {
            debug!(selector = strategy.selector(), error = %e, "Strategy failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::html::HtmlPage;

    fn page(html: &str) -> HtmlPage {
        HtmlPage::new("https://www.traderjoes.com/home/products/pdp/x-1", html)
    }

    #[tokio::test]
    async fn test_css_and_attribute() {
        let page = page(
            r#"<h1 class="title"> Mango Salsa </h1>
               <span itemprop="price" content="3.49">$3.49</span>"#,
        );

        assert_eq!(
            try_extract(&LocatorStrategy::css("h1.title"), &page).await.as_deref(),
            Some("Mango Salsa")
        );
        assert_eq!(
            try_extract(&LocatorStrategy::attribute("span[itemprop=price]", "content"), &page)
                .await
                .as_deref(),
            Some("3.49")
        );
        assert_eq!(try_extract(&LocatorStrategy::css("h2"), &page).await, None);
    }

    #[tokio::test]
    async fn test_text_contains_prefers_innermost() {
        let page = page(
            r#"<div class="outer"><div class="inner">Ingredients: oats, honey</div>
               <div>Other stuff</div></div>"#,
        );

        let text = try_extract(&LocatorStrategy::text_contains("div", "INGREDIENTS"), &page).await;
        assert_eq!(text.as_deref(), Some("Ingredients: oats, honey"));
    }

    #[tokio::test]
    async fn test_all_text_joins_items() {
        let page = page("<ul class='allergens'><li>Milk</li><li> </li><li>Soy</li></ul>");

        let strategy = LocatorStrategy::all_text("ul.allergens li");
        assert!(strategy.is_list());
        assert_eq!(try_extract(&strategy, &page).await.as_deref(), Some("Milk, Soy"));
    }

    #[tokio::test]
    async fn test_invalid_selector_is_swallowed() {
        let page = page("<h1>Name</h1>");
        assert_eq!(try_extract(&LocatorStrategy::css("h1[[["), &page).await, None);
    }

    #[test]
    fn test_serde_shape() {
        let strategy = LocatorStrategy::text_contains("div", "Nutrition Facts");
        let json = serde_json::to_value(&strategy).unwrap();
        assert_eq!(json["type"], "text_contains");
        assert_eq!(json["needle"], "Nutrition Facts");

        let back: LocatorStrategy = serde_json::from_value(json).unwrap();
        assert_eq!(back, strategy);
    }
}
