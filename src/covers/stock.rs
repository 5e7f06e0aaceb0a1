//! Keyword stock photos.
//!
//! Builds a deterministic, per-item rotated list of stock photo URLs for a
//! topical theme (or a generic list when nothing matched), then downloads the
//! first payload that is a real image and has not been used this run.

use super::catalog::Theme;
use super::{CoverSettings, RunContext};
use crate::http::ImageFetcher;
use crate::utils::{hex_window, normalize_space, sha256_hex};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static ASCII_TERM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z][a-z0-9]{2,}").unwrap());

const NOISY_TERMS: &[&str] = &["the", "and", "for", "with", "from", "news", "tech", "today"];

/// Stock payloads below this size are placeholders, whatever the setting.
const STOCK_FLOOR_BYTES: usize = 512;

/// Per-item seeds derived from one digest.
struct Seeds {
    digest: String,
    lock: u64,
    sig_base: u64,
}

impl Seeds {
    fn new(uid_source: &str) -> Self {
        let digest = sha256_hex(uid_source.as_bytes());
        let head = hex_window(&digest, 0, 8);
        Self { lock: head % 1_000_000 + 1, sig_base: head % 10_000, digest }
    }

    fn offset(&self, start: usize, len: usize) -> usize {
        if len == 0 { 0 } else { (hex_window(&self.digest, start, start + 4) % len as u64) as usize }
    }
}

fn rotate<T: Clone>(items: &[T], start: usize) -> Vec<T> {
    (0..items.len()).map(|i| items[(start + i) % items.len()].clone()).collect()
}

fn dedup_queries(queries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .map(|q| normalize_space(&q))
        .filter(|q| !q.is_empty() && seen.insert(q.to_lowercase()))
        .collect()
}

/// Matched keyword, `"<kw> technology"`, then the theme's own queries.
pub fn representative_queries(theme: &Theme, keyword: &str) -> Vec<String> {
    let keyword = normalize_space(keyword);
    let mut queries = Vec::new();
    if !keyword.is_empty() {
        queries.push(keyword.clone());
        queries.push(format!("{keyword} technology"));
    }
    queries.extend(theme.search_queries.iter().cloned());
    dedup_queries(queries)
}

/// Image-generation prompt for a photo of `theme`'s subject, used when no
/// curated prompt is available.
pub fn keyword_photo_prompt(theme: &Theme, keyword: &str, title: &str) -> String {
    let subject = theme
        .prompt_subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("a modern technology workplace");
    let keyword = normalize_space(keyword);
    let keyword = if keyword.is_empty() { theme.id.as_str() } else { keyword.as_str() };
    format!(
        "Photorealistic editorial photo, {subject}, topic: {}, keyword: {keyword}, \
         simple composition, natural lighting, high detail, no text, no logo, no watermark",
        normalize_space(title)
    )
}

/// Stock URLs for a matched topical theme.
pub fn keyword_stock_urls(theme: &Theme, keyword: &str, uid: &str, representative: bool) -> Vec<String> {
    let uid_source = if uid.is_empty() { format!("{}|{keyword}", theme.id) } else { uid.to_string() };
    let seeds = Seeds::new(&uid_source);

    let tags: Vec<String> = if theme.stock_tags.is_empty() {
        vec!["technology,computer".to_string()]
    } else {
        theme.stock_tags.clone()
    };
    let tags = rotate(&tags, seeds.offset(8, tags.len()));

    let mut queries = representative_queries(theme, keyword);
    if queries.is_empty() {
        queries.push(format!("{} technology", theme.id));
    }
    let queries = rotate(&queries, seeds.offset(12, queries.len()));

    let mut urls = Vec::new();
    if representative {
        for (i, query) in queries.iter().take(6).enumerate() {
            urls.push(format!(
                "https://source.unsplash.com/1600x900/?{}&sig={}",
                urlencoding::encode(query),
                seeds.sig_base + i as u64
            ));
        }
    }
    let keyword_tags = NON_ALNUM.replace_all(&keyword.to_lowercase(), ",").trim_matches(',').to_string();
    if !keyword_tags.is_empty() {
        urls.push(format!(
            "https://loremflickr.com/1600/900/{},technology?lock={}",
            urlencoding::encode(&keyword_tags),
            seeds.lock
        ));
    }
    for (i, tags) in tags.iter().take(4).enumerate() {
        urls.push(format!("https://loremflickr.com/1600/900/{tags}?lock={}", seeds.lock + i as u64));
    }
    let kw = if keyword.is_empty() { "tech" } else { keyword };
    let seed = format!("{}-{kw}-{}", theme.id, &seeds.digest[..10]);
    urls.push(format!("https://picsum.photos/seed/{}/1600/900", urlencoding::encode(&seed)));
    urls
}

/// Stock URLs when no topic matched, keyed by the first meaningful ASCII
/// word of the title and source.
pub fn generic_stock_urls(title: &str, source: &str, uid: &str, representative: bool) -> Vec<String> {
    let uid_source = if uid.is_empty() { format!("{source}|{title}") } else { uid.to_string() };
    let seeds = Seeds::new(&uid_source);

    let haystack = format!("{title} {source}").to_lowercase();
    let token = ASCII_TERM
        .find_iter(&haystack)
        .map(|m| m.as_str())
        .find(|t| !NOISY_TERMS.contains(t))
        .unwrap_or("technology")
        .to_string();

    let mut urls = Vec::new();
    if representative {
        let queries = dedup_queries(vec![
            format!("{token} technology"),
            format!("{source} technology"),
            "technology startup office".to_string(),
            "computer innovation workspace".to_string(),
        ]);
        let queries = rotate(&queries, seeds.offset(12, queries.len()));
        for (i, query) in queries.iter().take(4).enumerate() {
            urls.push(format!(
                "https://source.unsplash.com/1600x900/?{}&sig={}",
                urlencoding::encode(query),
                seeds.sig_base + i as u64
            ));
        }
    }
    urls.push(format!("https://loremflickr.com/1600/900/technology,computer?lock={}", seeds.lock));
    urls.push(format!(
        "https://loremflickr.com/1600/900/{},technology?lock={}",
        urlencoding::encode(&token),
        seeds.lock + 1
    ));
    urls.push(format!("https://picsum.photos/seed/{}/1600/900", &seeds.digest[..16]));
    urls
}

/// Download the first usable, unclaimed payload among `urls` and store it as
/// `<dir>/<stem>-stock<ext>`.
#[instrument(level = "debug", skip_all, fields(%stem, candidates = urls.len()))]
pub async fn download_stock<F: ImageFetcher>(
    fetcher: &F,
    settings: &CoverSettings,
    ctx: &mut RunContext,
    urls: &[String],
    dir: &Path,
    stem: &str,
) -> Option<PathBuf> {
    let min_bytes = settings.min_stock_bytes.max(STOCK_FLOOR_BYTES);
    for url in urls {
        let image = match fetcher.fetch_image(url, settings.stock_timeout, min_bytes).await {
            Ok(image) => image,
            Err(e) if e.is_rejection() => {
                debug!(%url, error = %e, "Stock candidate rejected");
                continue;
            }
            Err(e) => {
                warn!(%url, error = %e, "Stock candidate fetch failed");
                continue;
            }
        };
        if ctx.dedup.is_claimed(&image.bytes) {
            continue;
        }
        let path = dir.join(format!("{stem}-stock{}", image.extension(url)));
        if let Err(e) = fs::create_dir_all(dir).await {
            warn!(dir = %dir.display(), error = %e, "Cannot create image directory");
            return None;
        }
        if let Err(e) = fs::write(&path, &image.bytes).await {
            warn!(path = %path.display(), error = %e, "Cannot store stock photo");
            return None;
        }
        ctx.dedup.claim_bytes(&image.bytes);
        return Some(path);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covers::catalog::Catalog;
    use crate::http::testing::{StubFetcher, fake_png};
    use chrono::NaiveDate;

    #[test]
    fn test_representative_queries() {
        let theme = Catalog::builtin().topic("semiconductor").unwrap();
        let queries = representative_queries(theme, " 반도체 ");
        assert_eq!(queries[0], "반도체");
        assert_eq!(queries[1], "반도체 technology");
        assert_eq!(queries[2], "semiconductor wafer fabrication");
        assert_eq!(queries.len(), 5);
    }

    #[test]
    fn test_keyword_urls_are_deterministic() {
        let theme = Catalog::builtin().topic("cloud").unwrap();
        let a = keyword_stock_urls(theme, "cloud", "https://x/1", true);
        let b = keyword_stock_urls(theme, "cloud", "https://x/1", true);
        assert_eq!(a, b);
        assert_eq!(a.iter().filter(|u| u.contains("unsplash")).count(), 5);
        assert!(a.iter().any(|u| u.starts_with("https://loremflickr.com/1600/900/cloud,technology?lock=")));
        assert!(a.last().unwrap().starts_with("https://picsum.photos/seed/cloud-cloud-"));

        let plain = keyword_stock_urls(theme, "cloud", "https://x/1", false);
        assert!(plain.iter().all(|u| !u.contains("unsplash")));
    }

    #[test]
    fn test_generic_urls_pick_meaningful_token() {
        let urls = generic_stock_urls("The news for Kubernetes", "Blog", "u1", false);
        assert!(urls.iter().any(|u| u.contains("/kubernetes,technology?lock=")));
        let fallback = generic_stock_urls("삼성 소식", "", "u2", false);
        assert!(fallback.iter().any(|u| u.contains("/technology,technology?lock=")));
    }

    #[test]
    fn test_keyword_photo_prompt_uses_subject() {
        let theme = Catalog::builtin().topic("robotics").unwrap();
        let prompt = keyword_photo_prompt(theme, "humanoid", "  Humanoid  robots ship ");
        assert!(prompt.starts_with("Photorealistic editorial photo, a humanoid robot in an industrial workspace,"));
        assert!(prompt.contains("topic: Humanoid robots ship, keyword: humanoid,"));
        assert!(prompt.ends_with("no watermark"));

        let mut bare = theme.clone();
        bare.prompt_subject = None;
        assert!(keyword_photo_prompt(&bare, "", "T").contains("a modern technology workplace, topic: T, keyword: robotics,"));
    }

    #[tokio::test]
    async fn test_download_stock_claims_and_stores() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings { min_stock_bytes: 100, ..Default::default() };
        let mut ctx = RunContext::for_date(true, NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());
        let urls = vec![
            "https://stock.example/tiny.jpg".to_string(),
            "https://stock.example/a.jpg".to_string(),
            "https://stock.example/b.jpg".to_string(),
        ];
        let stub = StubFetcher::new()
            .with_image(&urls[0], "image/jpeg", fake_png(1, 300))
            .with_image(&urls[1], "image/jpeg", fake_png(2, 2048))
            .with_image(&urls[2], "image/jpeg", fake_png(2, 2048));

        let first = download_stock(&stub, &settings, &mut ctx, &urls, tmp.path(), "item-1")
            .await
            .unwrap();
        assert!(first.ends_with("item-1-stock.jpg"));
        assert_eq!(std::fs::read(&first).unwrap().len(), 2048);

        // Same bytes again: every candidate is either too small or already used.
        let second = download_stock(&stub, &settings, &mut ctx, &urls, tmp.path(), "item-2").await;
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_failed_store_leaves_bytes_unclaimed() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the image directory should be.
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, b"x").unwrap();

        let settings = CoverSettings { min_stock_bytes: 100, ..Default::default() };
        let mut ctx = RunContext::for_date(true, NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());
        let urls = vec!["https://stock.example/a.jpg".to_string()];
        let payload = fake_png(3, 2048);
        let stub = StubFetcher::new().with_image(&urls[0], "image/jpeg", payload.clone());

        let stored = download_stock(&stub, &settings, &mut ctx, &urls, &blocker, "item-1").await;
        assert!(stored.is_none());
        assert!(ctx.dedup.claim_bytes(&payload), "payload stays available after a failed write");
    }
}
