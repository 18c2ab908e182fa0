//! The navigable page the extractors read the story and chapter documents
//! through.
//!
//! Exactly one page is driven per run. Extractors take it as `&mut P` so the
//! navigation sequence stays explicit at every call site.

use async_trait::async_trait;

use crate::error::{Result, ScrapeError};

pub mod chrome;
pub mod static_html;

pub use chrome::ChromePage;
pub use static_html::StaticPage;

pub const INNER_TEXT: &str = "innerText";
pub const HREF: &str = "href";
pub const SRC: &str = "src";

#[async_trait]
pub trait Page: Send {
    /// Opaque handle to an element of the current document. Handles are only
    /// valid until the next navigation.
    type Element: Send + Sync;

    /// Loads `url` and returns once navigation has settled.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    fn current_url(&self) -> String;

    async fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>>;

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Like [`Page::query_selector`], scoped to descendants of `element`.
    async fn query_selector_in(
        &self,
        element: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>>;

    /// Reads a DOM property (`innerText`, `href`, `src`) as text. Absent
    /// properties read as the empty string.
    async fn property(&self, element: &Self::Element, name: &str) -> Result<String>;
}

/// Resolves a required element and reads one of its properties.
pub async fn required_property<P: Page>(
    page: &P,
    what: &'static str,
    selector: &'static str,
    property: &str,
) -> Result<String> {
    let element = page
        .query_selector(selector)
        .await?
        .ok_or_else(|| ScrapeError::missing(what, selector))?;
    page.property(&element, property).await
}
