//! Data models for collected news items and their resolved cover images.
//!
//! This module defines the core data structures used throughout the application:
//! - [`NewsItem`]: An item as discovered by a scraper, before any image work
//! - [`ResolvedImage`]: The `(image, prompt/provenance, provider)` triple
//! - [`ImageProvider`]: Stable provider tags the web viewer reports on
//! - [`NewsRecord`]: The persisted record, with Korean and English keys
//!
//! The Korean field names are part of the on-disk contract consumed by the
//! existing viewer, hence the explicit `#[serde(rename)]` attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Where a [`NewsItem`] was discovered.
///
/// The origin decides which provider tag a reused source image carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrigin {
    /// Scraped from an HTML list page (thumbnail next to the headline).
    ListPage,
    /// Parsed from an RSS or Atom feed.
    Feed,
    /// Read from a JSON API that never carries images.
    Api,
}

/// A news item as handed to the cover resolver.
///
/// The resolver only reads these fields; it never mutates the item.
#[derive(Debug, Clone)]
pub struct NewsItem {
    /// Headline.
    pub title: String,
    /// Canonical link to the article.
    pub link: String,
    /// Publisher or feed name (e.g. "TechCrunch").
    pub source_name: String,
    /// Image URL declared by the source itself, if any.
    pub source_image_url: Option<String>,
    /// Rights/license text attached to the item.
    pub item_rights: Option<String>,
    /// Concatenated license, rights and docs text of the feed.
    pub feed_rights: Option<String>,
    /// Description or lede text used as matching context.
    pub context: String,
    /// How the item was discovered.
    pub origin: ItemOrigin,
    /// Stable per-item key (link, or API id) used for deterministic choices.
    pub uid: String,
}

/// Provider tag recorded next to every resolved image.
///
/// The string forms are a stable vocabulary: the viewer and reporting scripts
/// group on them, so they must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageProvider {
    SourceOriginal,
    RssSourceImage,
    CompanyLogoVariant,
    CompanyLocalImagePool,
    CompanySearchedImagePool,
    CompanyLogo,
    KeywordStockPhoto,
    GeminiImage,
    SimpleIllustration,
}

impl ImageProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageProvider::SourceOriginal => "source-original",
            ImageProvider::RssSourceImage => "rss-source-image",
            ImageProvider::CompanyLogoVariant => "company-logo-variant",
            ImageProvider::CompanyLocalImagePool => "company-local-image-pool",
            ImageProvider::CompanySearchedImagePool => "company-searched-image-pool",
            ImageProvider::CompanyLogo => "company-logo",
            ImageProvider::KeywordStockPhoto => "keyword-stock-photo",
            ImageProvider::GeminiImage => "gemini-image",
            ImageProvider::SimpleIllustration => "simple-illustration",
        }
    }
}

impl fmt::Display for ImageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of cover resolution for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Remote URL, relative asset path, or inline `data:` URI. Never empty.
    pub image: String,
    /// Provenance tag (e.g. `company-local-pool:samsung:삼성:v2`) or the
    /// prompt used to generate the image.
    pub prompt: String,
    pub provider: ImageProvider,
}

/// Result of the AI curation step for one item.
#[derive(Debug, Clone, Default)]
pub struct Curation {
    pub summary: String,
    pub image_prompt: String,
    /// Model name that produced the curation, empty when none was used.
    pub model: String,
    /// One of `curation-disabled`, `curation-limit-reached`,
    /// `curation-fallback`, `curation-success`, `curation-error`, or
    /// `api-metadata` for items summarized from API fields.
    pub mode: String,
}

/// A persisted news record.
///
/// Every value is written twice, under the Korean key the viewer was built
/// against and under an English key. Keys this collector does not know are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    #[serde(rename = "국가", default)]
    pub country_ko: String,
    #[serde(rename = "매체", default)]
    pub media_ko: String,
    #[serde(rename = "제목", default)]
    pub title_ko: String,
    #[serde(rename = "링크", default)]
    pub link_ko: String,
    #[serde(rename = "요약", default)]
    pub summary_ko: String,
    #[serde(rename = "이미지", default)]
    pub image_ko: String,
    #[serde(rename = "수집일시", default)]
    pub collected_at_ko: String,
    #[serde(rename = "이미지프롬프트", default)]
    pub image_prompt_ko: String,
    #[serde(rename = "이미지생성방식", default)]
    pub image_provider_ko: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub media: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub collected_at: String,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default)]
    pub image_provider: String,
    #[serde(default)]
    pub curation_model: String,
    #[serde(default)]
    pub curation_mode: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Country bucket of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Domestic,
    Global,
}

impl Region {
    pub fn korean(&self) -> &'static str {
        match self {
            Region::Domestic => "국내",
            Region::Global => "미국",
        }
    }

    pub fn english(&self) -> &'static str {
        match self {
            Region::Domestic => "domestic",
            Region::Global => "global",
        }
    }
}

impl NewsRecord {
    /// Build a record from a collected item, its curation and its resolved image.
    pub fn new(
        region: Region,
        item: &NewsItem,
        curation: &Curation,
        image: &ResolvedImage,
        collected_at: &str,
    ) -> Self {
        let provider = image.provider.as_str().to_string();
        Self {
            country_ko: region.korean().to_string(),
            media_ko: item.source_name.clone(),
            title_ko: item.title.clone(),
            link_ko: item.link.clone(),
            summary_ko: curation.summary.clone(),
            image_ko: image.image.clone(),
            collected_at_ko: collected_at.to_string(),
            image_prompt_ko: image.prompt.clone(),
            image_provider_ko: provider.clone(),
            country: region.english().to_string(),
            media: item.source_name.clone(),
            title: item.title.clone(),
            link: item.link.clone(),
            summary: curation.summary.clone(),
            image: image.image.clone(),
            collected_at: collected_at.to_string(),
            image_prompt: image.prompt.clone(),
            image_provider: provider,
            curation_model: curation.model.clone(),
            curation_mode: curation.mode.clone(),
            extra: Map::new(),
        }
    }

    /// English value, falling back to the Korean key for records written by
    /// older collectors that only carried the Korean fields.
    pub fn title_any(&self) -> &str {
        pick(&self.title, &self.title_ko)
    }

    pub fn link_any(&self) -> &str {
        pick(&self.link, &self.link_ko)
    }

    pub fn media_any(&self) -> &str {
        pick(&self.media, &self.media_ko)
    }

    pub fn collected_at_any(&self) -> &str {
        pick(&self.collected_at, &self.collected_at_ko)
    }

    pub fn is_domestic(&self) -> bool {
        self.country == Region::Domestic.english() || self.country_ko == Region::Domestic.korean()
    }

    pub fn is_global(&self) -> bool {
        self.country == Region::Global.english() || self.country_ko == Region::Global.korean()
    }
}

fn pick<'a>(primary: &'a str, fallback: &'a str) -> &'a str {
    if primary.is_empty() { fallback } else { primary }
}
