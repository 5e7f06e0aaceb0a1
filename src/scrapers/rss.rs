//! RSS 2.0 and Atom feed reader.
//!
//! Feeds are parsed with `feed-rs`, which covers titles, links, summaries,
//! media objects and enclosures for every feed dialect. License tags that
//! `feed-rs` does not model (`creativecommons:license`, `cc:license`,
//! `dc:rights`, `media:copyright`, the channel `docs` URL) are picked up by a
//! separate `quick-xml` pass and matched to entries by document order.
//!
//! # Image Discovery
//!
//! In order: media content or an enclosure typed `image/*`, a media
//! thumbnail, an `image/*` link, then the first `<img src>` inside the
//! description HTML.
//!
//! # Failure Handling
//!
//! A feed that cannot be fetched or parsed yields an empty [`ParsedFeed`];
//! one broken feed never stops collection of the others.

use super::fetch_text;
use crate::models::{ItemOrigin, NewsItem};
use crate::utils::{html_to_text, normalize_space, sanitize_url, unescape_html};
use feed_rs::model::Entry;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use scraper::{Html, Selector};
use std::borrow::Cow;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// `(source name, feed URL)` for every global feed, in collection order.
pub const GLOBAL_FEEDS: &[(&str, &str)] = &[
    ("TechCrunch", "https://techcrunch.com/feed/"),
    ("The Verge", "https://www.theverge.com/rss/index.xml"),
    ("Wired", "https://www.wired.com/feed/rss"),
    ("Ars Technica", "https://feeds.arstechnica.com/arstechnica/index"),
    ("OpenAI Blog", "https://openai.com/news/rss.xml"),
    ("Google DeepMind", "https://deepmind.google/blog/rss.xml"),
    ("Google Research", "https://research.google/blog/rss"),
    ("Microsoft Research", "https://www.microsoft.com/en-us/research/feed/"),
];

pub const MAX_ITEMS_PER_FEED: usize = 8;
const TIMEOUT: Duration = Duration::from_secs(10);

/// One entry of a feed, before it becomes a [`NewsItem`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Description as plain text.
    pub description: String,
    /// Description as published (HTML).
    pub description_html: String,
    pub image_url: Option<String>,
    pub item_rights: Option<String>,
}

/// License-related text declared once for the whole feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedRights {
    /// RSS `copyright`, Atom `rights` or `dc:rights`.
    pub rights: String,
    pub license: String,
    pub docs: String,
}

impl FeedRights {
    /// License, rights and docs joined by spaces; `None` if all are blank.
    pub fn combined(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.license, &self.rights, &self.docs]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() { None } else { Some(parts.join(" ")) }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    pub entries: Vec<FeedEntry>,
    pub rights: FeedRights,
}

impl ParsedFeed {
    /// Convert entries into pipeline items attributed to `source`.
    pub fn into_items(self, source: &str) -> Vec<NewsItem> {
        let feed_rights = self.rights.combined();
        self.entries
            .into_iter()
            .map(|entry| NewsItem {
                uid: if entry.link.is_empty() { entry.title.clone() } else { entry.link.clone() },
                title: entry.title,
                link: entry.link,
                source_name: source.to_string(),
                source_image_url: entry.image_url,
                item_rights: entry.item_rights,
                feed_rights: feed_rights.clone(),
                context: entry.description,
                origin: ItemOrigin::Feed,
            })
            .collect()
    }
}

/// Fetch and parse one feed. Never fails; problems are logged.
#[instrument(level = "info", skip(client))]
pub async fn fetch_feed(client: &reqwest::Client, source: &str, url: &str) -> ParsedFeed {
    let xml = match fetch_text(client, url, TIMEOUT).await {
        Ok(xml) => xml,
        Err(e) => {
            warn!(error = %e, "Feed fetch failed");
            return ParsedFeed::default();
        }
    };
    match parse_feed(&xml, MAX_ITEMS_PER_FEED) {
        Ok(feed) => {
            info!(count = feed.entries.len(), "Parsed feed");
            feed
        }
        Err(e) => {
            warn!(error = %e, "Feed parse failed");
            ParsedFeed::default()
        }
    }
}

const ITEM_RIGHTS_TAGS: &[&str] =
    &["media:copyright", "dc:rights", "creativecommons:license", "cc:license"];
const FEED_RIGHTS_TAGS: &[&str] =
    &["creativecommons:license", "cc:license", "license", "dc:rights", "docs"];

/// Rights tags found outside the `feed-rs` model, as `(tag, text)` pairs.
#[derive(Debug, Default)]
struct RightsTags {
    feed: Vec<(String, String)>,
    /// One list per `item`/`entry`, in document order.
    items: Vec<Vec<(String, String)>>,
}

impl RightsTags {
    fn first_of(found: &[(String, String)], names: &[&str]) -> String {
        names
            .iter()
            .filter_map(|name| found.iter().find(|(tag, text)| tag == name && !text.is_empty()))
            .map(|(_, text)| text.clone())
            .next()
            .unwrap_or_default()
    }

    fn feed_text(&self, names: &[&str]) -> String {
        Self::first_of(&self.feed, names)
    }

    fn item_text(&self, index: usize, names: &[&str]) -> String {
        self.items.get(index).map(|found| Self::first_of(found, names)).unwrap_or_default()
    }

    fn record(&mut self, scope: Scope, tag: String, text: &str) {
        let slot = match scope {
            Scope::Feed => Some(&mut self.feed),
            Scope::Item => self.items.last_mut(),
        };
        if let Some(slot) = slot {
            slot.push((tag, normalize_space(text)));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Feed,
    Item,
}

/// A rights tag whose text is being collected.
struct Capture {
    scope: Scope,
    tag: String,
    text: String,
    depth: usize,
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn xml_unescape(raw: &str) -> String {
    quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn tag_name(start: &BytesStart<'_>) -> String {
    lossy(start.name().as_ref()).to_lowercase()
}

/// Link-style license tags carry the URL in an attribute.
fn resource_attr(start: &BytesStart<'_>) -> Option<String> {
    start
        .attributes()
        .filter_map(Result::ok)
        .find(|a| matches!(lossy(a.key.as_ref()).to_lowercase().as_str(), "rdf:resource" | "href"))
        .map(|a| xml_unescape(&lossy(&a.value)))
}

fn scope_of(path: &[String], tag: &str) -> Option<Scope> {
    let in_item = path.iter().any(|p| p == "item" || p == "entry");
    if in_item {
        return ITEM_RIGHTS_TAGS.contains(&tag).then_some(Scope::Item);
    }
    let parent = path.last().map(String::as_str);
    (matches!(parent, Some("channel" | "feed")) && FEED_RIGHTS_TAGS.contains(&tag))
        .then_some(Scope::Feed)
}

/// Collect the rights tags `feed-rs` drops. Stops quietly at the first
/// malformed event and keeps what was found so far.
fn scan_rights_tags(xml: &str) -> RightsTags {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut tags = RightsTags::default();
    let mut path: Vec<String> = Vec::new();
    let mut capture: Option<Capture> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = tag_name(&e);
                if capture.is_none() {
                    if let Some(scope) = scope_of(&path, &tag) {
                        let text = resource_attr(&e).unwrap_or_default();
                        capture = Some(Capture { scope, tag: tag.clone(), text, depth: path.len() });
                    }
                }
                if tag == "item" || tag == "entry" {
                    tags.items.push(Vec::new());
                }
                path.push(tag);
            }
            Ok(Event::Empty(e)) => {
                let tag = tag_name(&e);
                if tag == "item" || tag == "entry" {
                    tags.items.push(Vec::new());
                } else if let Some(scope) = scope_of(&path, &tag) {
                    let text = resource_attr(&e).unwrap_or_default();
                    tags.record(scope, tag, &text);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(c) = capture.as_mut() {
                    c.text.push_str(&xml_unescape(&lossy(&e)));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(c) = capture.as_mut() {
                    c.text.push_str(&lossy(&e));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(c) = capture.as_mut() {
                    c.text.push_str(&xml_unescape(&format!("&{};", lossy(&e))));
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
                if capture.as_ref().is_some_and(|c| c.depth == path.len()) {
                    if let Some(c) = capture.take() {
                        tags.record(c.scope, c.tag, &c.text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "Rights scan stopped early");
                break;
            }
        }
    }
    tags
}

/// Feed-level text: strip literal CDATA markers, then decode HTML entities.
fn clean_feed_text(text: &str) -> String {
    let value = normalize_space(text);
    let value = value
        .strip_prefix("<![CDATA[")
        .and_then(|v| v.strip_suffix("]]>"))
        .unwrap_or(&value);
    normalize_space(&unescape_html(value))
}

fn first_img_src(html: &str) -> Option<String> {
    if !html.contains("<img") {
        return None;
    }
    let selector = Selector::parse("img[src]").ok()?;
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .find_map(sanitize_url)
        .map(str::to_string)
}

/// The entry's page link: first `alternate` (or untyped) link, else any.
fn entry_link(entry: &Entry) -> String {
    let hrefs = || entry.links.iter().map(|l| (l, l.href.trim())).filter(|(_, h)| !h.is_empty());
    hrefs()
        .find(|(l, _)| l.rel.as_deref().is_none_or(|r| r.is_empty() || r.eq_ignore_ascii_case("alternate")))
        .or_else(|| hrefs().next())
        .and_then(|(_, href)| sanitize_url(href))
        .map(str::to_string)
        .unwrap_or_default()
}

fn entry_image(entry: &Entry, description_html: &str) -> Option<String> {
    let is_image = |mime: &str| mime.to_ascii_lowercase().starts_with("image/");

    let content = entry
        .media
        .iter()
        .flat_map(|m| &m.content)
        .filter(|c| c.content_type.as_ref().is_none_or(|t| is_image(&t.essence().to_string())))
        .filter_map(|c| c.url.as_ref())
        .find_map(|url| sanitize_url(url.as_str()));
    let thumbnail = || {
        entry
            .media
            .iter()
            .flat_map(|m| &m.thumbnails)
            .find_map(|t| sanitize_url(&t.image.uri))
    };
    let link = || {
        entry
            .links
            .iter()
            .filter(|l| l.media_type.as_deref().is_some_and(is_image))
            .find_map(|l| sanitize_url(&l.href))
    };
    content
        .or_else(thumbnail)
        .or_else(link)
        .map(str::to_string)
        .or_else(|| first_img_src(description_html))
}

fn parse_entry(entry: Entry, index: usize, tags: &RightsTags) -> FeedEntry {
    let description_html = entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .unwrap_or_default()
        .trim()
        .to_string();

    let item_rights = [
        tags.item_text(index, &["media:copyright"]),
        entry.rights.as_ref().map(|r| normalize_space(&r.content)).unwrap_or_default(),
        tags.item_text(index, &["dc:rights", "creativecommons:license", "cc:license"]),
    ]
    .into_iter()
    .find(|r| !r.is_empty());

    FeedEntry {
        title: clean_feed_text(entry.title.as_ref().map(|t| t.content.as_str()).unwrap_or("")),
        link: entry_link(&entry),
        description: clean_feed_text(&html_to_text(&description_html)),
        image_url: entry_image(&entry, &description_html),
        description_html,
        item_rights,
    }
}

/// Parse up to `max_items` entries and the feed's rights metadata.
pub fn parse_feed(xml: &str, max_items: usize) -> Result<ParsedFeed, Box<dyn Error>> {
    let feed = feed_rs::parser::parse(xml.as_bytes())?;
    let tags = scan_rights_tags(xml);

    let declared = feed.rights.as_ref().map(|r| normalize_space(&r.content)).unwrap_or_default();
    let rights = FeedRights {
        rights: if declared.is_empty() { tags.feed_text(&["dc:rights"]) } else { declared },
        license: tags.feed_text(&["creativecommons:license", "cc:license", "license"]),
        docs: tags.feed_text(&["docs"]),
    };

    let entries: Vec<FeedEntry> = feed
        .entries
        .into_iter()
        .take(max_items)
        .enumerate()
        .map(|(i, entry)| parse_entry(entry, i, &tags))
        .collect();
    debug!(count = entries.len(), scanned = tags.items.len(), "Parsed feed entries");
    Ok(ParsedFeed { entries, rights })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Example Tech</title>
    <copyright>Licensed under CC-BY 4.0</copyright>
    <docs>https://www.rssboard.org/rss-specification</docs>
    <item>
      <title><![CDATA[Samsung unveils new chip]]></title>
      <link>https://example.com/samsung-chip</link>
      <description><![CDATA[<p>The <b>new</b> chip is fast.</p><img src="https://example.com/inline.jpg"/>]]></description>
      <media:content url="https://cdn.example.com/hero.jpg" medium="image"/>
      <dc:rights>All Rights Reserved</dc:rights>
    </item>
    <item>
      <title>AT&amp;T &amp;amp; cloud</title>
      <link>https://example.com/att</link>
      <description>&lt;p&gt;Plain &amp;rsquo;quoted&amp;rsquo;&lt;/p&gt;&lt;img src="https://example.com/escaped.png"&gt;</description>
      <enclosure url="https://example.com/audio.mp3" type="audio/mpeg"/>
    </item>
    <item>
      <title>Enclosure image</title>
      <link>https://example.com/enc</link>
      <enclosure url="https://example.com/enc.png" type="image/png"/>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title>Research Blog</title>
  <rights>© 2025 Example Corp. All rights reserved.</rights>
  <entry>
    <title type="html">Robots &amp; arms</title>
    <link rel="self" href="https://example.org/feed/1"/>
    <link rel="alternate" href="https://example.org/posts/robots"/>
    <summary>Robots everywhere.</summary>
    <media:thumbnail url="https://example.org/thumb.jpg"/>
  </entry>
  <entry>
    <title>No alternate</title>
    <link href="https://example.org/posts/two"/>
    <content type="html">&lt;p&gt;Second&lt;/p&gt;</content>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items() {
        let feed = parse_feed(RSS, 8).unwrap();
        assert_eq!(feed.entries.len(), 3);

        let first = &feed.entries[0];
        assert_eq!(first.title, "Samsung unveils new chip");
        assert_eq!(first.link, "https://example.com/samsung-chip");
        assert_eq!(first.description, "The new chip is fast.");
        assert_eq!(first.image_url.as_deref(), Some("https://cdn.example.com/hero.jpg"));
        assert_eq!(first.item_rights.as_deref(), Some("All Rights Reserved"));

        let second = &feed.entries[1];
        assert_eq!(second.title, "AT&T & cloud");
        assert_eq!(second.description, "Plain \u{2019}quoted\u{2019}");
        assert_eq!(second.image_url.as_deref(), Some("https://example.com/escaped.png"));
        assert_eq!(second.item_rights, None);

        assert_eq!(feed.entries[2].image_url.as_deref(), Some("https://example.com/enc.png"));
    }

    #[test]
    fn test_parse_rss_feed_rights() {
        let feed = parse_feed(RSS, 8).unwrap();
        assert_eq!(feed.rights.rights, "Licensed under CC-BY 4.0");
        assert_eq!(feed.rights.license, "");
        assert_eq!(feed.rights.docs, "https://www.rssboard.org/rss-specification");
        assert_eq!(
            feed.rights.combined().as_deref(),
            Some("Licensed under CC-BY 4.0 https://www.rssboard.org/rss-specification")
        );
        assert!(crate::covers::rights::feed_allows(&feed.rights.combined().unwrap()));
    }

    #[test]
    fn test_parse_atom_entries() {
        let feed = parse_feed(ATOM, 8).unwrap();
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title, "Robots & arms");
        assert_eq!(feed.entries[0].link, "https://example.org/posts/robots");
        assert_eq!(feed.entries[0].description, "Robots everywhere.");
        assert_eq!(feed.entries[0].image_url.as_deref(), Some("https://example.org/thumb.jpg"));
        assert_eq!(feed.entries[1].link, "https://example.org/posts/two");
        assert_eq!(feed.entries[1].description, "Second");
        assert_eq!(feed.rights.rights, "© 2025 Example Corp. All rights reserved.");
        assert!(!crate::covers::rights::feed_allows(&feed.rights.combined().unwrap()));
    }

    #[test]
    fn test_item_cap_and_conversion() {
        let feed = parse_feed(RSS, 2).unwrap();
        assert_eq!(feed.entries.len(), 2);
        let items = feed.into_items("Example Tech");
        assert_eq!(items[0].source_name, "Example Tech");
        assert_eq!(items[0].uid, "https://example.com/samsung-chip");
        assert_eq!(items[0].origin, ItemOrigin::Feed);
        assert_eq!(items[0].context, "The new chip is fast.");
        assert_eq!(items[1].feed_rights, items[0].feed_rights);
    }

    #[test]
    fn test_literal_cdata_markers_are_stripped() {
        assert_eq!(clean_feed_text("  <![CDATA[The Verge &amp; more]]> "), "The Verge & more");
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_feed("not xml at all", 8).is_err());
    }

    const CC_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:creativeCommons="http://backend.userland.com/creativeCommonsRssModule"
     xmlns:cc="http://web.resource.org/cc/"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Open Lab</title>
    <creativeCommons:license>http://creativecommons.org/licenses/by/4.0/</creativeCommons:license>
    <item>
      <title>Licensed item</title>
      <link>https://lab.example/one</link>
      <cc:license rdf:resource="http://creativecommons.org/licenses/by-sa/4.0/"/>
    </item>
    <item>
      <title>Credited item</title>
      <link>https://lab.example/two</link>
      <media:content url="https://lab.example/two.jpg" type="image/jpeg">
        <media:copyright>Photo: Lab staff</media:copyright>
      </media:content>
    </item>
    <item>
      <title>Plain item</title>
      <link>https://lab.example/three</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_creative_commons_tags() {
        let feed = parse_feed(CC_RSS, 8).unwrap();
        assert_eq!(feed.rights.license, "http://creativecommons.org/licenses/by/4.0/");
        assert!(crate::covers::rights::feed_allows(&feed.rights.combined().unwrap()));

        assert_eq!(
            feed.entries[0].item_rights.as_deref(),
            Some("http://creativecommons.org/licenses/by-sa/4.0/")
        );
        assert_eq!(feed.entries[1].item_rights.as_deref(), Some("Photo: Lab staff"));
        assert_eq!(feed.entries[1].image_url.as_deref(), Some("https://lab.example/two.jpg"));
        assert_eq!(feed.entries[2].item_rights, None);
    }

    #[test]
    fn test_rights_scan_follows_document_order() {
        let tags = scan_rights_tags(CC_RSS);
        assert_eq!(tags.items.len(), 3);
        assert_eq!(tags.item_text(1, &["media:copyright"]), "Photo: Lab staff");
        assert_eq!(tags.item_text(2, ITEM_RIGHTS_TAGS), "");
        assert_eq!(tags.item_text(9, ITEM_RIGHTS_TAGS), "");
    }
}
