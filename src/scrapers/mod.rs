//! News sources.
//!
//! Each submodule turns one kind of source into [`NewsItem`](crate::models::NewsItem)s:
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Naver News IT/Science | [`naver`] | HTML scraping | List page only; thumbnails and ledes come with the list |
//! | Global tech feeds | [`rss`] | RSS/Atom parsing | Eight feeds, eight items each, with rights metadata |
//! | Hacker News | [`hackernews`] | Firebase JSON API | Top ten stories, no images |
//!
//! # Common Patterns
//!
//! - Every request carries an explicit timeout and the shared client's
//!   browser user agent
//! - A failed source is logged and contributes no items; it never aborts the run
//! - Parsing is split from fetching so it can be tested on fixture text

pub mod hackernews;
pub mod naver;
pub mod rss;

use std::error::Error;
use std::time::Duration;
use tracing::debug;

/// GET `url` and return the body as text, failing on a non-2xx status.
pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, Box<dyn Error>> {
    let res = client.get(url).timeout(timeout).send().await?;
    let status = res.status();
    if !status.is_success() {
        return Err(format!("unexpected status {status} from {url}").into());
    }
    let body = res.text().await?;
    debug!(%url, bytes = body.len(), "Fetched page");
    Ok(body)
}
