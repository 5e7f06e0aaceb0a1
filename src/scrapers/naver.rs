//! Naver News IT/Science section scraper.
//!
//! Scrapes the section list page at <https://news.naver.com/section/105>. Each
//! `.sa_item_inner` block carries the headline link, an optional thumbnail,
//! the press name and a one-line lede, so no article page is fetched.

use super::fetch_text;
use crate::models::{ItemOrigin, NewsItem};
use crate::utils::{normalize_space, sanitize_url};
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

pub const SECTION_URL: &str = "https://news.naver.com/section/105";
const BASE_URL: &str = "https://news.naver.com";
const DEFAULT_MEDIA: &str = "네이버 뉴스";
const MAX_ITEMS: usize = 10;
const TIMEOUT: Duration = Duration::from_secs(8);

/// Fetch the section page and parse its items.
#[instrument(level = "info", skip_all)]
pub async fn fetch_items(client: &reqwest::Client) -> Result<Vec<NewsItem>, Box<dyn Error>> {
    let html = fetch_text(client, SECTION_URL, TIMEOUT).await?;
    let items = parse_list_page(&html)?;
    info!(count = items.len(), source = SECTION_URL, "Indexed Naver items");
    Ok(items)
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_space(&element.text().collect::<Vec<_>>().join(" "))
}

/// Parse up to ten items from a section list page.
///
/// Blocks without a text area or headline link are skipped. Relative links
/// are resolved against `https://news.naver.com`.
pub fn parse_list_page(html: &str) -> Result<Vec<NewsItem>, Box<dyn Error>> {
    let base = Url::parse(BASE_URL)?;
    let document = Html::parse_document(html);
    let item_selector = Selector::parse(".sa_item_inner")?;
    let text_selector = Selector::parse(".sa_text")?;
    let link_selector = Selector::parse("a[href]")?;
    let thumb_selector = Selector::parse(".sa_thumb img")?;
    let press_selector = Selector::parse(".sa_text_press")?;
    let lede_selector = Selector::parse(".sa_text_lede")?;

    let mut items = Vec::new();
    for block in document.select(&item_selector).take(MAX_ITEMS) {
        let Some(text_area) = block.select(&text_selector).next() else {
            continue;
        };
        let Some(link_elem) = text_area.select(&link_selector).next() else {
            continue;
        };

        let title = element_text(link_elem);
        let href = link_elem.value().attr("href").unwrap_or_default().trim();
        let link = if href.starts_with("http") {
            href.to_string()
        } else {
            match base.join(href) {
                Ok(resolved) => resolved.to_string(),
                Err(_) => continue,
            }
        };

        let source_image_url = block.select(&thumb_selector).next().and_then(|img| {
            let attrs = img.value();
            [attrs.attr("src"), attrs.attr("data-src")]
                .into_iter()
                .flatten()
                .find_map(sanitize_url)
                .map(str::to_string)
        });

        let media = text_area
            .select(&press_selector)
            .next()
            .map(element_text)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MEDIA.to_string());
        let lede = text_area
            .select(&lede_selector)
            .next()
            .map(element_text)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| title.clone());

        debug!(%title, %media, has_thumb = source_image_url.is_some(), "Parsed Naver item");
        items.push(NewsItem {
            title,
            uid: link.clone(),
            link,
            source_name: media,
            source_image_url,
            item_rights: None,
            feed_rights: None,
            context: lede,
            origin: ItemOrigin::ListPage,
        });
    }
    Ok(items)
}
