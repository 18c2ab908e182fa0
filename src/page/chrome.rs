use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use headless_chrome::protocol::cdp::DOM;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};

use crate::error::{Result, ScrapeError};
use crate::page::Page;

const CHROME_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-infobars",
    "--no-zygote",
    "--no-first-run",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--disable-gpu",
    "--hide-scrollbars",
    "--disable-notifications",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-component-extensions-with-background-pages",
    "--disable-extensions",
    "--disable-features=TranslateUI,BlinkGenPropertyTrees",
    "--disable-ipc-flooding-protection",
    "--disable-renderer-backgrounding",
    "--force-color-profile=srgb",
    "--metrics-recording-only",
    "--mute-audio",
];

const READ_PROPERTY_JS: &str = r#"function (name) {
    const value = this[name];
    return value === undefined || value === null ? "" : String(value);
}"#;

#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub navigation_timeout: Duration,
}

/// A single headless Chromium tab. The browser process lives as long as the
/// page does.
pub struct ChromePage {
    _browser: Browser,
    tab: Arc<Tab>,
}

/// DOM node id of a matched element in the tab's current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeElement(DOM::NodeId);

impl ChromePage {
    pub async fn launch(options: ChromeOptions) -> anyhow::Result<Self> {
        tokio::task::spawn_blocking(move || Self::launch_blocking(options))
            .await
            .context("spawn_blocking join")?
    }

    fn launch_blocking(options: ChromeOptions) -> anyhow::Result<Self> {
        let args = CHROME_ARGS.iter().map(OsStr::new).collect::<Vec<_>>();
        let launch_options = LaunchOptions::default_builder()
            .headless(options.headless)
            .sandbox(false)
            .path(options.executable.clone())
            .idle_browser_timeout(options.navigation_timeout.max(Duration::from_secs(60)))
            .args(args)
            .build()
            .map_err(|err| anyhow::anyhow!("build chrome launch options: {err}"))?;

        let browser = Browser::new(launch_options).context("launch chrome")?;
        let tab = browser.new_tab().context("open chrome tab")?;
        tab.set_default_timeout(options.navigation_timeout);

        tracing::debug!(headless = options.headless, "chrome launched");
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    async fn with_tab<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || job(&tab))
            .await
            .map_err(|err| ScrapeError::Page(anyhow::anyhow!("devtools worker: {err}")))?
            .map_err(ScrapeError::Page)
    }
}

fn document_node(tab: &Tab) -> anyhow::Result<DOM::NodeId> {
    Ok(tab.get_document().context("get document")?.node_id)
}

fn query_one(
    tab: &Tab,
    node_id: DOM::NodeId,
    selector: String,
) -> anyhow::Result<Option<ChromeElement>> {
    let found = tab
        .call_method(DOM::QuerySelector { node_id, selector })
        .context("DOM.querySelector")?;
    // node id 0 is the protocol's "no match"
    Ok((found.node_id != 0).then_some(ChromeElement(found.node_id)))
}

#[async_trait]
impl Page for ChromePage {
    type Element = ChromeElement;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        let url = url.to_owned();
        tracing::debug!(%url, "chrome navigate");
        self.with_tab(move |tab| {
            tab.navigate_to(&url)
                .with_context(|| format!("navigate to {url}"))?;
            tab.wait_until_navigated()
                .with_context(|| format!("wait for navigation to {url}"))?;
            Ok(())
        })
        .await
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<ChromeElement>> {
        let selector = selector.to_owned();
        self.with_tab(move |tab| {
            let root = document_node(tab)?;
            query_one(tab, root, selector)
        })
        .await
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ChromeElement>> {
        let selector = selector.to_owned();
        self.with_tab(move |tab| {
            let root = document_node(tab)?;
            let found = tab
                .call_method(DOM::QuerySelectorAll {
                    node_id: root,
                    selector,
                })
                .context("DOM.querySelectorAll")?;
            Ok(found.node_ids.into_iter().map(ChromeElement).collect())
        })
        .await
    }

    async fn query_selector_in(
        &self,
        element: &ChromeElement,
        selector: &str,
    ) -> Result<Option<ChromeElement>> {
        let scope = element.0;
        let selector = selector.to_owned();
        self.with_tab(move |tab| query_one(tab, scope, selector)).await
    }

    async fn property(&self, element: &ChromeElement, name: &str) -> Result<String> {
        let node_id = element.0;
        let name = name.to_owned();
        self.with_tab(move |tab| {
            let element = Element::new(tab, node_id).context("resolve element")?;
            let object = element
                .call_js_fn(READ_PROPERTY_JS, vec![serde_json::json!(name)], false)
                .with_context(|| format!("read property {name}"))?;
            Ok(match object.value {
                Some(serde_json::Value::String(text)) => text,
                Some(other) => other.to_string(),
                None => String::new(),
            })
        })
        .await
    }
}
