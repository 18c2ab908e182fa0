use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use url::Url;

use crate::chapter::ChapterScraper;
use crate::cli::{Engine, ScrapeArgs};
use crate::fetch::{Endpoints, Fetch, HttpFetch};
use crate::formats::StoryRecord;
use crate::metadata::MetadataScraper;
use crate::page::chrome::{ChromeOptions, ChromePage};
use crate::page::{Page, StaticPage};

pub async fn run(args: ScrapeArgs) -> anyhow::Result<()> {
    let started = Instant::now();
    let endpoints = Endpoints::new(&args.base_url).context("parse --base-url")?;
    let story_url = validate_story_url(&args.url, &endpoints)?;

    let out_path = PathBuf::from(&args.out);
    crate::store::ensure_output_available(&out_path, args.force).await?;

    let timeout = Duration::from_secs(args.timeout_secs.max(1));
    let fetch: Arc<dyn Fetch> =
        Arc::new(HttpFetch::new(timeout, args.retries).context("build http fetcher")?);
    let scraper = ChapterScraper::new(Arc::clone(&fetch), endpoints);

    tracing::info!(
        url = %story_url,
        engine = ?args.engine,
        out = %out_path.display(),
        "scrape: start"
    );
    let story = match args.engine {
        Engine::Static => {
            let mut page = StaticPage::new(fetch).context("open static page")?;
            scrape_story(&mut page, &story_url, &scraper).await?
        }
        Engine::Chrome => {
            let mut page = ChromePage::launch(ChromeOptions {
                headless: !args.headful,
                executable: args.chrome_path.as_ref().map(PathBuf::from),
                navigation_timeout: timeout,
            })
            .await
            .context("launch chrome")?;
            scrape_story(&mut page, &story_url, &scraper).await?
        }
    };

    crate::store::write_story(&out_path, &story)
        .await
        .context("write story record")?;

    tracing::info!(
        story = story.id,
        chapters = story.chapters.len(),
        out = %out_path.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scrape: done"
    );
    Ok(())
}

/// Runs both passes against `page`: story metadata first, then every chapter.
pub async fn scrape_story<P: Page>(
    page: &mut P,
    story_url: &Url,
    chapters: &ChapterScraper,
) -> anyhow::Result<StoryRecord> {
    page.navigate(story_url.as_str())
        .await
        .with_context(|| format!("open story page: {story_url}"))?;

    let mut story = MetadataScraper::new()
        .scrape(page)
        .await
        .context("extract story metadata")?;
    tracing::info!(
        story = story.id,
        title = %story.title,
        chapters = story.chapters.len(),
        "scrape: metadata"
    );

    chapters
        .scrape(page, &mut story)
        .await
        .context("extract chapter details")?;
    Ok(story)
}

fn validate_story_url(raw: &str, endpoints: &Endpoints) -> anyhow::Result<Url> {
    let url = Url::parse(raw).context("parse --url")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("--url must be http/https: {url}");
    }

    let base = endpoints.base();
    let same_origin = url.scheme() == base.scheme()
        && url.host_str() == base.host_str()
        && url.port_or_known_default() == base.port_or_known_default();
    if !same_origin || !is_under_path(url.path(), base.path()) {
        anyhow::bail!("--url must be under --base-url {base}: {url}");
    }
    Ok(url)
}

/// Whole-segment prefix match: `/mirror/` covers `/mirror/x` but not `/mirrorx`.
fn is_under_path(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    prefix.is_empty() || path == prefix || path.starts_with(&format!("{prefix}/"))
}
