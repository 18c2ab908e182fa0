use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub profile: Url,
}

/// One scraped story. Written to disk as the run's only artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: u64,
    pub title: String,
    pub is_paid: bool,
    pub is_ongoing: bool,
    pub cover_image: Url,
    pub author: Author,
    pub reading_time: String,
    pub view_count: u64,
    pub star_count: u64,
    pub first_published_at: DateTime<Utc>,
    pub chapters: Vec<ChapterRecord>,
}

/// One chapter link discovered on the story page.
///
/// `id` and `text` stay `None`, and the counters stay zero, until the chapter
/// detail pass has visited the chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub number: u32,
    pub link: Url,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    pub is_new: bool,
    pub is_nsfw: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub read_count: u64,
    pub vote_count: u64,
    pub comment_count: u64,
    pub page_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ChapterRecord {
    pub fn discovered(number: u32, link: Url, name: String) -> Self {
        Self {
            number,
            link,
            name,
            release_date_text: None,
            release_date: None,
            is_new: false,
            is_nsfw: false,
            id: None,
            read_count: 0,
            vote_count: 0,
            comment_count: 0,
            page_count: 0,
            text: None,
        }
    }
}
