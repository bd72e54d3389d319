//! Page handles over a static HTML document.
//!
//! `scraper::Html` is not `Send`, so handles keep the raw document and an
//! element path instead of parsed nodes. Each `query_all` parses the
//! document once, walks the path, and snapshots the text and attributes of
//! every match before dropping the tree, so reading an element never parses
//! again. Element handles are a chain of `(selector, index)` steps from the
//! root.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RenderError, RenderResult};
use crate::traits::renderer::{Element, Page};

type Path = Vec<(String, usize)>;

fn parse_selector(selector: &str) -> RenderResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| RenderError::InvalidSelector(format!("{selector}: {e:?}")))
}

/// Resolve a path against a freshly parsed document and apply `f`.
fn with_element<T>(
    document: &str,
    path: &[(String, usize)],
    f: impl FnOnce(ElementRef<'_>) -> T,
) -> RenderResult<T> {
    let html = Html::parse_document(document);
    let mut current = html.root_element();
    for (selector, index) in path {
        let selector = parse_selector(selector)?;
        current = current
            .select(&selector)
            .nth(*index)
            .ok_or(RenderError::Detached)?;
    }
    Ok(f(current))
}

/// Text and attributes captured while the tree was parsed.
#[derive(Debug)]
struct Snapshot {
    text: String,
    attributes: HashMap<String, String>,
}

impl Snapshot {
    fn of(el: ElementRef<'_>) -> Self {
        Self {
            text: el.text().collect(),
            attributes: el
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

fn children(
    document: &Arc<str>,
    path: &[(String, usize)],
    selector: &str,
) -> RenderResult<Vec<HtmlElement>> {
    let parsed = parse_selector(selector)?;
    let snapshots: Vec<Snapshot> =
        with_element(document, path, |el| el.select(&parsed).map(Snapshot::of).collect())?;
    Ok(snapshots
        .into_iter()
        .enumerate()
        .map(|(i, snapshot)| {
            let mut child = path.to_vec();
            child.push((selector.to_string(), i));
            HtmlElement {
                document: Arc::clone(document),
                path: child,
                snapshot: Arc::new(snapshot),
            }
        })
        .collect())
}

/// A loaded static page.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    url: String,
    document: Arc<str>,
}

impl HtmlPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            document: Arc::from(html.into()),
        }
    }

    /// Raw document source.
    pub fn html(&self) -> &str {
        &self.document
    }
}

#[async_trait]
impl Page for HtmlPage {
    type Element = HtmlElement;

    fn url(&self) -> &str {
        &self.url
    }

    async fn title(&self) -> RenderResult<Option<String>> {
        let selector = parse_selector("title")?;
        let html = Html::parse_document(&self.document);
        Ok(html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    async fn query_all(&self, selector: &str) -> RenderResult<Vec<HtmlElement>> {
        children(&self.document, &[], selector)
    }

    /// Static documents have no pending requests.
    async fn wait_for_network_idle(&self) -> RenderResult<()> {
        Ok(())
    }
}

/// An element located on an [`HtmlPage`].
#[derive(Debug, Clone)]
pub struct HtmlElement {
    document: Arc<str>,
    path: Path,
    snapshot: Arc<Snapshot>,
}

#[async_trait]
impl Element for HtmlElement {
    async fn text_content(&self) -> RenderResult<Option<String>> {
        Ok(Some(self.snapshot.text.clone()))
    }

    async fn attribute(&self, name: &str) -> RenderResult<Option<String>> {
        Ok(self.snapshot.attributes.get(name).cloned())
    }

    async fn query_all(&self, selector: &str) -> RenderResult<Vec<Self>> {
        children(&self.document, &self.path, selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <html><head><title> Mango Salsa | Trader Joe's </title></head>
        <body>
          <ul class="list">
            <li><a href="/a">A</a></li>
            <li><a href="/b" aria-current="page">B</a></li>
          </ul>
          <table><tr><td>Calories</td><td>150</td></tr></table>
        </body></html>"#;

    #[tokio::test]
    async fn test_title_and_url() {
        let page = HtmlPage::new("https://example.com/p", DOC);
        assert_eq!(page.url(), "https://example.com/p");
        assert_eq!(
            page.title().await.unwrap().as_deref(),
            Some("Mango Salsa | Trader Joe's")
        );
    }

    #[tokio::test]
    async fn test_nested_queries() {
        let page = HtmlPage::new("https://example.com/p", DOC);

        let items = page.query_all("ul.list li").await.unwrap();
        assert_eq!(items.len(), 2);

        let links = items[1].query_all("a").await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].attribute("href").await.unwrap().as_deref(), Some("/b"));
        assert_eq!(
            links[0].attribute("aria-current").await.unwrap().as_deref(),
            Some("page")
        );
        assert_eq!(links[0].text_content().await.unwrap().as_deref(), Some("B"));

        let row = page.query("tr").await.unwrap().unwrap();
        let cells = row.query_all("td, th").await.unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1].text_content().await.unwrap().as_deref(), Some("150"));
    }

    #[tokio::test]
    async fn test_missing_and_invalid_selectors() {
        let page = HtmlPage::new("https://example.com/p", DOC);
        assert!(page.query("h1").await.unwrap().is_none());
        assert!(matches!(
            page.query_all("li[[").await,
            Err(RenderError::InvalidSelector(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_come_from_the_matching_parse() {
        let page = HtmlPage::new("https://example.com/p", DOC);
        let links = page.query_all("a").await.unwrap();

        let texts: Vec<_> = futures::future::join_all(links.iter().map(|a| a.text_content()))
            .await
            .into_iter()
            .map(|t| t.unwrap().unwrap())
            .collect();
        assert_eq!(texts, vec!["A", "B"]);
        assert_eq!(links[0].attribute("aria-current").await.unwrap(), None);
        assert_eq!(links[1].path, vec![("a".to_string(), 1)]);
    }
}
