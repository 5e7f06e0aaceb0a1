//! HTTP boundary for image downloads and image search.
//!
//! All network access performed by the cover pipeline goes through the
//! [`ImageFetcher`] trait. The production implementation, [`HttpFetcher`],
//! wraps a shared `reqwest::Client`; tests substitute an in-memory stub.
//!
//! # Contract
//!
//! - Every call carries an explicit timeout.
//! - A non-2xx status, a non-image content type, or an undersized body is an
//!   `Err(FetchError)`, never a panic and never an empty success.
//! - There is no retry: callers move on to their next candidate.

use crate::error::{FetchError, FetchResult};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Browser-like user agent; several logo/stock endpoints refuse bare clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const COMMONS_API: &str = "https://commons.wikimedia.org/w/api.php";

/// Extensions accepted for pool images and downloaded covers.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "svg", "gif", "ico"];

/// A successfully downloaded image payload.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl FetchedImage {
    /// File extension (with leading dot) inferred from the content type, then
    /// from the URL path, defaulting to `.jpg`.
    pub fn extension(&self, url: &str) -> String {
        guess_extension(&self.content_type, url)
    }
}

/// Trait for the network operations the cover pipeline needs.
///
/// Implementors must honour the timeout they are given and report every
/// failure as a [`FetchError`].
#[allow(async_fn_in_trait)]
pub trait ImageFetcher {
    /// Download `url` and accept it only if it is an `image/*` response of at
    /// least `min_bytes` bytes.
    async fn fetch_image(
        &self,
        url: &str,
        timeout: Duration,
        min_bytes: usize,
    ) -> FetchResult<FetchedImage>;

    /// Search Wikimedia Commons for files matching `query`, returning direct
    /// file URLs.
    async fn search_image_urls(
        &self,
        query: &str,
        limit: usize,
        timeout: Duration,
    ) -> FetchResult<Vec<String>>;
}

/// [`ImageFetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl ImageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self), fields(%url))]
    async fn fetch_image(
        &self,
        url: &str,
        timeout: Duration,
        min_bytes: usize,
    ) -> FetchResult<FetchedImage> {
        let t0 = Instant::now();
        let res = self.client.get(url).timeout(timeout).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.contains("image/") {
            return Err(FetchError::NotImage { content_type });
        }

        let bytes = res.bytes().await?.to_vec();
        if bytes.len() < min_bytes {
            return Err(FetchError::TooSmall { len: bytes.len(), min: min_bytes });
        }

        debug!(
            bytes = bytes.len(),
            %content_type,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched image"
        );
        Ok(FetchedImage { bytes, content_type })
    }

    #[instrument(level = "debug", skip(self), fields(%query))]
    async fn search_image_urls(
        &self,
        query: &str,
        limit: usize,
        timeout: Duration,
    ) -> FetchResult<Vec<String>> {
        let limit = limit.clamp(1, 20).to_string();
        let res = self
            .client
            .get(COMMONS_API)
            .query(&[
                ("action", "query"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrnamespace", "6"),
                ("gsrlimit", limit.as_str()),
                ("prop", "imageinfo"),
                ("iiprop", "url|mime"),
                ("format", "json"),
            ])
            .timeout(timeout)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: COMMONS_API.to_string(),
            });
        }
        let data: serde_json::Value = res.json().await?;
        let urls = parse_commons_urls(&data);
        debug!(count = urls.len(), "Commons search results");
        Ok(urls)
    }
}

/// Pull `query.pages.*.imageinfo[0].url` out of a Commons API response.
pub fn parse_commons_urls(data: &serde_json::Value) -> Vec<String> {
    let Some(pages) = data.pointer("/query/pages").and_then(|p| p.as_object()) else {
        return Vec::new();
    };
    pages
        .values()
        .filter_map(|page| page.pointer("/imageinfo/0/url").and_then(|u| u.as_str()))
        .filter_map(crate::utils::sanitize_url)
        .map(str::to_string)
        .collect()
}

/// Guess a file extension (with leading dot) from a MIME type, falling back
/// to the URL path suffix and finally `.jpg`.
pub fn guess_extension(content_type: &str, url: &str) -> String {
    let ct = content_type.to_ascii_lowercase();
    let by_mime = [
        ("svg", ".svg"),
        ("png", ".png"),
        ("webp", ".webp"),
        ("gif", ".gif"),
        ("icon", ".ico"),
        ("ico", ".ico"),
        ("jpeg", ".jpg"),
        ("jpg", ".jpg"),
    ];
    if let Some((_, ext)) = by_mime.iter().find(|(needle, _)| ct.contains(needle)) {
        return ext.to_string();
    }

    let path_part = url.split('?').next().unwrap_or_default();
    let suffix = Path::new(path_part)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match suffix {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => format!(".{ext}"),
        _ => ".jpg".to_string(),
    }
}

/// MIME type for an inline logo, chosen from the URL suffix.
pub fn logo_mime_for_url(url: &str) -> &'static str {
    let path_part = url.split('?').next().unwrap_or_default().to_ascii_lowercase();
    if path_part.ends_with(".svg") {
        "image/svg+xml"
    } else if path_part.ends_with(".ico") {
        "image/x-icon"
    } else {
        "image/png"
    }
}
