//! Hacker News top stories via the public Firebase API.
//!
//! Stories carry no image and no description; the summary is built from the
//! story's metadata instead of being curated.

use crate::models::{ItemOrigin, NewsItem};
use crate::utils::sanitize_url;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const SOURCE_NAME: &str = "Hacker News";
const API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
const TOP_STORIES: usize = 10;
const INDEX_TIMEOUT: Duration = Duration::from_secs(5);
const ITEM_TIMEOUT: Duration = Duration::from_secs(3);
const PAUSE: Duration = Duration::from_millis(100);

/// An item as returned by `/v0/item/<id>.json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Story {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub url: Option<String>,
    pub score: i64,
    pub descendants: i64,
    pub by: String,
}

impl Story {
    pub fn is_story(&self) -> bool {
        self.kind == "story"
    }

    /// `Points: <score> | Comments: <descendants> | By: <by>`.
    pub fn summary(&self) -> String {
        format!("Points: {} | Comments: {} | By: {}", self.score, self.descendants, self.by)
    }

    /// External URL, else the discussion page.
    pub fn link(&self) -> String {
        self.url
            .as_deref()
            .and_then(sanitize_url)
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", self.id))
    }

    pub fn to_item(&self) -> NewsItem {
        NewsItem {
            title: self.title.clone(),
            link: self.link(),
            source_name: SOURCE_NAME.to_string(),
            source_image_url: None,
            item_rights: None,
            feed_rights: None,
            context: self.title.clone(),
            origin: ItemOrigin::Api,
            uid: self.id.to_string(),
        }
    }
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<T, Box<dyn Error>> {
    let res = client.get(url).timeout(timeout).send().await?;
    let status = res.status();
    if !status.is_success() {
        return Err(format!("unexpected status {status} from {url}").into());
    }
    Ok(res.json::<T>().await?)
}

/// Ids of the current top stories, first ten.
#[instrument(level = "info", skip_all)]
pub async fn index_stories(client: &reqwest::Client) -> Result<Vec<u64>, Box<dyn Error>> {
    let url = format!("{API_BASE}/topstories.json");
    let mut ids: Vec<u64> = get_json(client, &url, INDEX_TIMEOUT).await?;
    ids.truncate(TOP_STORIES);
    info!(count = ids.len(), "Indexed Hacker News stories");
    Ok(ids)
}

/// Fetch each id in order, keeping only `story` items. Failed fetches are
/// logged and skipped.
#[instrument(level = "info", skip_all)]
pub async fn fetch_stories(client: &reqwest::Client, ids: Vec<u64>) -> Vec<Story> {
    let stories: Vec<Story> = stream::iter(ids)
        .then(|id| async move {
            let url = format!("{API_BASE}/item/{id}.json");
            let fetched: Result<Option<Story>, _> = get_json(client, &url, ITEM_TIMEOUT).await;
            tokio::time::sleep(PAUSE).await;
            match fetched {
                Ok(Some(story)) if story.is_story() => Some(story),
                Ok(_) => {
                    debug!(id, "Skipping non-story item");
                    None
                }
                Err(e) => {
                    warn!(id, error = %e, "Hacker News item fetch failed");
                    None
                }
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(count = stories.len(), "Fetched Hacker News stories");
    stories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_deserialize_and_summary() {
        let story: Story = serde_json::from_str(
            r#"{"id": 42, "type": "story", "title": "Show HN: A thing", "url": "https://a.example/x",
                "score": 120, "descendants": 33, "by": "pg", "kids": [1, 2]}"#,
        )
        .unwrap();
        assert!(story.is_story());
        assert_eq!(story.summary(), "Points: 120 | Comments: 33 | By: pg");

        let item = story.to_item();
        assert_eq!(item.link, "https://a.example/x");
        assert_eq!(item.uid, "42");
        assert_eq!(item.context, "Show HN: A thing");
        assert_eq!(item.origin, ItemOrigin::Api);
        assert_eq!(item.source_name, "Hacker News");
    }

    #[test]
    fn test_story_defaults_and_link_fallback() {
        let story: Story = serde_json::from_str(r#"{"id": 7, "type": "job", "title": "Hiring"}"#).unwrap();
        assert!(!story.is_story());
        assert_eq!(story.summary(), "Points: 0 | Comments: 0 | By: ");
        assert_eq!(story.link(), "https://news.ycombinator.com/item?id=7");
    }
}
