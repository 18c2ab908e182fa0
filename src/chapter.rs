//! Second pass: visits every discovered chapter on the shared page, reads its
//! counters and assembles its text from the paginated text endpoint.

use std::sync::Arc;

use crate::count::parse_count;
use crate::error::{Result, ScrapeError};
use crate::fetch::{Endpoints, Fetch};
use crate::formats::{ChapterRecord, StoryRecord};
use crate::metadata::numeric_path_segment;
use crate::page::{INNER_TEXT, Page};

const CHAPTER_READS: &str = "div.story-stats>span.reads";
const CHAPTER_VOTES: &str = "div.story-stats>span.votes";
const CHAPTER_COMMENTS: &str = "div.story-stats>span.comments>a";

/// Zero-based `/`-segment of a chapter URL holding `<id>-<slug>`.
const CHAPTER_ID_SEGMENT: usize = 3;

pub struct ChapterScraper {
    fetch: Arc<dyn Fetch>,
    endpoints: Endpoints,
}

impl ChapterScraper {
    pub fn new(fetch: Arc<dyn Fetch>, endpoints: Endpoints) -> Self {
        Self { fetch, endpoints }
    }

    /// Completes every chapter of `story` in order, then navigates `page` back
    /// to the URL it was showing before the first chapter.
    pub async fn scrape<P: Page>(&self, page: &mut P, story: &mut StoryRecord) -> Result<()> {
        let origin = page.current_url();
        let total = story.chapters.len();
        let story_id = story.id;

        for chapter in &mut story.chapters {
            tracing::info!(
                chapter = chapter.number,
                total,
                from = %page.current_url(),
                to = %chapter.link,
                "scraping chapter detail"
            );
            self.complete(page, story_id, chapter).await?;
        }

        tracing::debug!(url = %origin, "restoring story page");
        page.navigate(&origin).await
    }

    /// Fills in one chapter's detail fields. Fields set before a failing step
    /// keep their values.
    pub async fn complete<P: Page>(
        &self,
        page: &mut P,
        story_id: u64,
        chapter: &mut ChapterRecord,
    ) -> Result<()> {
        page.navigate(chapter.link.as_str()).await?;

        let id = numeric_path_segment("chapter id", &page.current_url(), CHAPTER_ID_SEGMENT)?;
        chapter.id = Some(id);

        chapter.read_count = read_stat(page, "chapter reads", CHAPTER_READS).await?;
        chapter.vote_count = read_stat(page, "chapter votes", CHAPTER_VOTES).await?;
        chapter.comment_count = read_stat(page, "chapter comments", CHAPTER_COMMENTS).await?;

        chapter.is_nsfw = self.is_nsfw(story_id).await?;

        let (text, pages) = assemble_text(self.fetch.as_ref(), &self.endpoints, id).await?;
        tracing::debug!(
            chapter = chapter.number,
            id,
            pages,
            chars = text.len(),
            "chapter text assembled"
        );
        chapter.page_count = pages;
        chapter.text = Some(text);

        Ok(())
    }

    /// The classification is story-scoped, so every chapter of a story gets
    /// the same answer.
    async fn is_nsfw(&self, story_id: u64) -> Result<bool> {
        let body = self.fetch.get_text(&self.endpoints.safety(story_id)).await?;
        Ok(!body.contains('1'))
    }
}

async fn read_stat<P: Page>(page: &P, what: &'static str, selector: &'static str) -> Result<u64> {
    let element = page
        .query_selector(selector)
        .await?
        .ok_or_else(|| ScrapeError::missing(what, selector))?;
    let text = page.property(&element, INNER_TEXT).await?;
    parse_count(&text)
}

/// Pulls text pages `0, 1, 2, ...` until a page adds nothing to the buffer.
/// Returns the text and the number of pages requested, the terminal one
/// included.
pub async fn assemble_text(
    fetch: &dyn Fetch,
    endpoints: &Endpoints,
    chapter_id: u64,
) -> Result<(String, u64)> {
    let mut text = String::new();
    let mut page = 0_u64;

    loop {
        let before = text.len();
        let body = fetch
            .get_text(&endpoints.story_text(chapter_id, page))
            .await?;
        text.push_str(&body);
        page += 1;

        if text.len() == before {
            break;
        }
    }

    Ok((text, page))
}
