use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::error::{Result, ScrapeError};

pub const DEFAULT_BASE_URL: &str = "https://www.wattpad.com";

const BASE_BACKOFF_MS: u64 = 500;
const CLIENT_USER_AGENT: &str = concat!("wattscrape/", env!("CARGO_PKG_VERSION"));

/// GET-as-text capability used for the auxiliary endpoints (and by the static
/// page engine for documents).
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// The site's undocumented endpoints, rooted at a configurable origin.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("parse base url: {base}"))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            anyhow::bail!("base url must be http/https: {base}");
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn root(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Story-scoped brand-safety classification. A body containing `1` means safe.
    pub fn safety(&self, story_id: u64) -> String {
        format!("{}/v5/stories/{story_id}/classification/safety", self.root())
    }

    /// One page of a chapter's text. Pages past the end come back empty.
    pub fn story_text(&self, chapter_id: u64, page: u64) -> String {
        format!(
            "{}/apiv2/?m=storytext&id={chapter_id}&page={page}",
            self.root()
        )
    }
}

/// `reqwest`-backed fetcher. Transient failures (connect errors, timeouts,
/// 429 and 5xx) are retried with exponential backoff before surfacing.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
    retries: u32,
}

impl HttpFetch {
    pub fn new(timeout: Duration, retries: u32) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build http client")?;
        Ok(Self { client, retries })
    }

    async fn get_once(&self, url: &str) -> Result<String, Attempt> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "text/html,application/json;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|err| Attempt {
                transient: err.is_timeout() || err.is_connect() || err.is_request(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Attempt {
                transient: status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
                reason: format!("status {status}"),
            });
        }

        response.text().await.map_err(|err| Attempt {
            transient: err.is_timeout(),
            reason: format!("read body: {err}"),
        })
    }
}

struct Attempt {
    transient: bool,
    reason: String,
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn get_text(&self, url: &str) -> Result<String> {
        let mut attempt = 0_u32;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(failure) if failure.transient && attempt < self.retries => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2_u64.pow(attempt));
                    tracing::warn!(
                        url,
                        attempt = attempt + 1,
                        retries = self.retries,
                        reason = %failure.reason,
                        "transient fetch failure; backing off {:.1}s",
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(failure) => {
                    return Err(ScrapeError::Endpoint {
                        url: url.to_owned(),
                        reason: failure.reason,
                    });
                }
            }
        }
    }
}
