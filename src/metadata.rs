//! Story-level extraction from a page already sitting on a story's landing
//! view. No navigation happens here.

use chrono::{DateTime, Utc};
use url::Url;

use crate::count::parse_count;
use crate::dates::{normalize_release_date, parse_timestamp};
use crate::error::{Result, ScrapeError};
use crate::formats::{Author, ChapterRecord, StoryRecord};
use crate::page::{HREF, INNER_TEXT, Page, SRC, required_property};

const AUTHOR_LINK: &str =
    "div .story-header>div.story-info>div.author-info>div.author-info__username>a";
const COVER_IMAGE: &str = "div.story-header>div.story-cover>img";
const PAID_INDICATOR: &str = "div.story-header>div.story-info>div.paid-indicator";
const STORY_TITLE: &str = "div.story-header>div.story-info>div.story-info__title";
const BEST_RANKING_CARD: &str = "a.card.on-navigate";
const STATS_ITEMS: &str = "div.story-header>div.story-info>ul>li.stats-item>span.sr-only";
const CHAPTER_LINKS: &str = "div.story-parts>ul>li>a";
const CHAPTER_TITLE: &str = "div.left-container>div.part__label>div.part-title";
const CHAPTER_NEW_ICON: &str = "div.left-container>div.part__label>div.icon-container>span";
const CHAPTER_RELEASE_DATE: &str = "div.right-label";
const COMPLETION_BADGE: &str = "div.story-badges>div.completed>div.tag-item";
const PUBLISH_DATE: &str = "div.story-badges>div#publish-date>strong";

/// Zero-based `/`-segment of the ranking card href holding the story id.
const STORY_ID_SEGMENT: usize = 4;

/// Aggregate numbers read from the story header.
#[derive(Debug, Default, PartialEq, Eq)]
struct StoryStats {
    reading_time: String,
    parts: u64,
    star_count: u64,
    view_count: u64,
}

pub struct MetadataScraper {
    clock: fn() -> DateTime<Utc>,
}

impl Default for MetadataScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataScraper {
    pub fn new() -> Self {
        Self { clock: Utc::now }
    }

    /// Uses `clock` as the extraction wall-clock for relative release dates.
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }

    pub async fn scrape<P: Page>(&self, page: &P) -> Result<StoryRecord> {
        let author = scrape_author(page).await?;

        let cover = required_property(page, "cover image", COVER_IMAGE, SRC).await?;
        let cover_image = parse_url("cover image", &cover)?;

        let is_paid = page.query_selector(PAID_INDICATOR).await?.is_some();

        let title = required_property(page, "story title", STORY_TITLE, INNER_TEXT)
            .await?
            .trim()
            .to_owned();

        let ranking_href = required_property(page, "story id", BEST_RANKING_CARD, HREF).await?;
        let id = numeric_path_segment("story id", &ranking_href, STORY_ID_SEGMENT)?;

        let stats = scrape_stats(page).await?;
        let chapters = self.scrape_chapters(page, stats.parts).await?;

        let status = required_property(page, "completion status", COMPLETION_BADGE, INNER_TEXT)
            .await?;
        let is_ongoing = status.trim() == "Ongoing";

        let published = required_property(page, "publish date", PUBLISH_DATE, INNER_TEXT).await?;
        let first_published_at = parse_timestamp(&published).ok_or_else(|| {
            ScrapeError::parse("publish date", published.trim(), "unrecognized date format")
        })?;

        tracing::info!(
            story = id,
            %title,
            chapters = chapters.len(),
            "story metadata scraped"
        );

        Ok(StoryRecord {
            id,
            title,
            is_paid,
            is_ongoing,
            cover_image,
            author,
            reading_time: stats.reading_time,
            view_count: stats.view_count,
            star_count: stats.star_count,
            first_published_at,
            chapters,
        })
    }

    async fn scrape_chapters<P: Page>(
        &self,
        page: &P,
        expected_parts: u64,
    ) -> Result<Vec<ChapterRecord>> {
        let links = page.query_selector_all(CHAPTER_LINKS).await?;
        if links.is_empty() {
            return Err(ScrapeError::missing("chapter list", CHAPTER_LINKS));
        }
        if expected_parts != links.len() as u64 {
            tracing::debug!(
                expected_parts,
                found = links.len(),
                "parts stat disagrees with chapter links; using links"
            );
        }

        let now = (self.clock)();
        let mut chapters = Vec::with_capacity(links.len());

        for (index, link) in links.iter().enumerate() {
            let number = index as u32 + 1;

            let href = page.property(link, HREF).await?;
            let title = page
                .query_selector_in(link, CHAPTER_TITLE)
                .await?
                .ok_or_else(|| ScrapeError::missing("chapter title", CHAPTER_TITLE))?;
            let name = page.property(&title, INNER_TEXT).await?.trim().to_owned();

            let link_url = parse_url("chapter link", &href)?;
            let mut chapter = ChapterRecord::discovered(number, link_url, name);
            chapter.is_new = page
                .query_selector_in(link, CHAPTER_NEW_ICON)
                .await?
                .is_some();

            match page.query_selector_in(link, CHAPTER_RELEASE_DATE).await? {
                Some(label) => {
                    let raw = page.property(&label, INNER_TEXT).await?;
                    let text = normalize_release_date(&raw, now);
                    chapter.release_date = parse_timestamp(&text);
                    chapter.release_date_text = Some(text);
                }
                None => {
                    tracing::warn!(
                        chapter = number,
                        selector = CHAPTER_RELEASE_DATE,
                        "chapter has no release date; leaving it unset"
                    );
                }
            }

            chapters.push(chapter);
        }

        Ok(chapters)
    }
}

async fn scrape_author<P: Page>(page: &P) -> Result<Author> {
    let link = page
        .query_selector(AUTHOR_LINK)
        .await?
        .ok_or_else(|| ScrapeError::missing("author", AUTHOR_LINK))?;
    let name = page.property(&link, INNER_TEXT).await?.trim().to_owned();
    let profile = page.property(&link, HREF).await?;

    Ok(Author {
        name,
        profile: parse_url("author profile", &profile)?,
    })
}

async fn scrape_stats<P: Page>(page: &P) -> Result<StoryStats> {
    let items = page.query_selector_all(STATS_ITEMS).await?;
    if items.is_empty() {
        return Err(ScrapeError::missing("story stats", STATS_ITEMS));
    }

    let mut stats = StoryStats::default();
    for item in &items {
        let text = page.property(item, INNER_TEXT).await?;
        apply_stat(&mut stats, &text)?;
    }
    Ok(stats)
}

/// Classifies one accessibility label (`"Reads 12.3K"`, `"Time 2 hours"`)
/// into the stat it carries. The first matching keyword wins.
fn apply_stat(stats: &mut StoryStats, text: &str) -> Result<()> {
    if text.contains("Time") {
        stats.reading_time = text
            .split(' ')
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ");
    } else if text.contains("Parts") {
        stats.parts = stat_value("parts", text)?;
    } else if text.contains("Votes") {
        stats.star_count = stat_value("votes", text)?;
    } else if text.contains("Reads") {
        stats.view_count = stat_value("reads", text)?;
    }
    Ok(())
}

fn stat_value(what: &'static str, text: &str) -> Result<u64> {
    let token = text
        .split(' ')
        .nth(1)
        .ok_or_else(|| ScrapeError::parse(what, text, "missing value after label"))?;
    parse_count(token)
}

fn parse_url(what: &'static str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|err| ScrapeError::parse(what, raw, err))
}

/// Reads the numeric prefix (before any `-`) of the `index`-th `/`-delimited
/// segment of `url`. `https://host/123-slug` has `123-slug` at index 3.
pub(crate) fn numeric_path_segment(what: &'static str, url: &str, index: usize) -> Result<u64> {
    let segment = url
        .split('/')
        .nth(index)
        .ok_or_else(|| ScrapeError::parse(what, url, format!("no path segment {index}")))?;
    let digits = segment.split('-').next().unwrap_or_default();
    digits
        .parse::<u64>()
        .map_err(|err| ScrapeError::parse(what, url, err))
}
