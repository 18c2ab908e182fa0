use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::fetch::Fetch;
use crate::page::{HREF, INNER_TEXT, Page, SRC};

/// Page engine that loads documents with a plain GET and answers selector
/// queries from the parsed HTML. No scripts run, so it only sees markup the
/// server rendered.
pub struct StaticPage {
    fetch: Arc<dyn Fetch>,
    url: Url,
    html: String,
}

/// Snapshot of one matched element: its outer HTML and the document URL used
/// to absolutize `href`/`src`.
#[derive(Debug, Clone)]
pub struct StaticElement {
    outer_html: String,
    base: Url,
}

impl StaticPage {
    pub fn new(fetch: Arc<dyn Fetch>) -> anyhow::Result<Self> {
        Ok(Self {
            fetch,
            url: Url::parse("about:blank")?,
            html: String::new(),
        })
    }

    /// Starts the page on an already-loaded document.
    pub fn with_document(fetch: Arc<dyn Fetch>, url: Url, html: impl Into<String>) -> Self {
        Self {
            fetch,
            url,
            html: html.into(),
        }
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        Url::parse(url)
            .or_else(|_| self.url.join(url))
            .map_err(|err| ScrapeError::parse("navigation url", url, err))
    }
}

#[async_trait]
impl Page for StaticPage {
    type Element = StaticElement;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        let target = self.resolve(url)?;
        tracing::debug!(url = %target, "static navigate");

        let html = self.fetch.get_text(target.as_str()).await.map_err(|err| {
            ScrapeError::Page(anyhow::Error::new(err).context(format!("load page {target}")))
        })?;

        self.url = target;
        self.html = html;
        Ok(())
    }

    fn current_url(&self) -> String {
        self.url.to_string()
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<StaticElement>> {
        Ok(select_in_document(&self.html, &self.url, selector, 1)?
            .into_iter()
            .next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<StaticElement>> {
        select_in_document(&self.html, &self.url, selector, usize::MAX)
    }

    async fn query_selector_in(
        &self,
        element: &StaticElement,
        selector: &str,
    ) -> Result<Option<StaticElement>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&element.outer_html);
        let Some(scope) = fragment_element(&fragment) else {
            return Ok(None);
        };

        Ok(scope.select(&selector).next().map(|found| StaticElement {
            outer_html: found.html(),
            base: element.base.clone(),
        }))
    }

    async fn property(&self, element: &StaticElement, name: &str) -> Result<String> {
        let fragment = Html::parse_fragment(&element.outer_html);
        let Some(el) = fragment_element(&fragment) else {
            return Ok(String::new());
        };

        let value = match name {
            INNER_TEXT => inner_text(el),
            HREF | SRC => match el.value().attr(name) {
                Some(raw) => element
                    .base
                    .join(raw.trim())
                    .map(|url| url.to_string())
                    .unwrap_or_else(|_| raw.to_owned()),
                None => String::new(),
            },
            other => el.value().attr(other).unwrap_or_default().to_owned(),
        };
        Ok(value)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|err| ScrapeError::Page(anyhow::anyhow!("invalid selector {selector:?}: {err}")))
}

fn select_in_document(
    html: &str,
    base: &Url,
    selector: &str,
    limit: usize,
) -> Result<Vec<StaticElement>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .take(limit)
        .map(|el| StaticElement {
            outer_html: el.html(),
            base: base.clone(),
        })
        .collect())
}

fn fragment_element(fragment: &Html) -> Option<ElementRef<'_>> {
    fragment.root_element().children().find_map(ElementRef::wrap)
}

/// Approximates the rendered `innerText`: text nodes joined, whitespace runs
/// collapsed.
fn inner_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
