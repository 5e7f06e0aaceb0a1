//! Per-company pools of cover variants.
//!
//! A pool is assembled once per run and theme, from three sources in order:
//!
//! 1. **Local discovery** of curated files under the pool root
//!    (`<id>-*.<ext>`, `<id>_*.<ext>`, `<id>/*.<ext>`)
//! 2. **Remote population** when the local pool is below target: candidate
//!    URLs are downloaded and persisted as `<id>/auto-<hash>.<ext>`
//! 3. **Generated variants**: SVG covers compositing the brand logo, written
//!    under `<image_dir>/company_variants/`
//!
//! Selection is either a pure daily rotation or a random pick that avoids
//! repeating the previous pick for the same theme.

use super::catalog::Theme;
use super::render::{brand_variant_svg, data_uri};
use super::{CoverSettings, RunContext};
use crate::http::{IMAGE_EXTENSIONS, ImageFetcher, logo_mime_for_url};
use crate::models::ImageProvider;
use crate::utils::{hex_window, normalize_space, sanitize_url, sha256_hex, to_web_path};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

static TRAILING_SEQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[-_])v?(\d+)$").unwrap());
static INNER_SEQ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[-_])v?(\d+)(?:[-_].*)?$").unwrap());

const UNSEQUENCED: u64 = 10_000;
const MIN_CANDIDATE_BYTES: usize = 80;
const MIN_LOGO_BYTES: usize = 120;
const LOGO_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the entries of a pool came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolSource {
    LocalPool,
    SearchedPool,
    GeneratedLogoVariants,
}

impl PoolSource {
    /// Provenance prefix recorded in the image prompt.
    pub fn tag(&self) -> &'static str {
        match self {
            PoolSource::LocalPool => "company-local-pool",
            PoolSource::SearchedPool => "company-searched-pool",
            PoolSource::GeneratedLogoVariants => "company-logo-variant",
        }
    }

    pub fn provider(&self) -> ImageProvider {
        match self {
            PoolSource::LocalPool => ImageProvider::CompanyLocalImagePool,
            PoolSource::SearchedPool => ImageProvider::CompanySearchedImagePool,
            PoolSource::GeneratedLogoVariants => ImageProvider::CompanyLogoVariant,
        }
    }
}

/// Ordered variant files for one brand theme.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantPool {
    pub entries: Vec<PathBuf>,
    pub source: PoolSource,
}

impl VariantPool {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn all_exist(&self) -> bool {
        self.entries.iter().all(|p| p.exists())
    }
}

/// Sort key for pool files: curated before `auto-`, then embedded sequence
/// number, then lower-cased name.
fn order_key(path: &Path) -> (u8, u64, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let seq = TRAILING_SEQ
        .captures(&stem)
        .or_else(|| INNER_SEQ.captures(&stem))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
        .unwrap_or(UNSEQUENCED);
    let auto_bias = u8::from(stem.starts_with("auto-"));
    (auto_bias, seq, name)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn list_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Curated and previously downloaded files for `theme_id`, in pool order.
pub fn discover_local(pool_root: &Path, theme_id: &str) -> Vec<PathBuf> {
    let flat_prefixes = [format!("{theme_id}-"), format!("{theme_id}_")];
    let mut found: Vec<PathBuf> = list_files(pool_root)
        .into_iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| flat_prefixes.iter().any(|prefix| n.starts_with(prefix)))
        })
        .collect();
    found.extend(list_files(&pool_root.join(theme_id)));

    let mut ordered: Vec<PathBuf> = found.into_iter().filter(|p| has_image_extension(p)).collect();
    ordered.sort_by_cached_key(|p| order_key(p));
    ordered
}

/// Commons queries for a company: name logo/company logo/wordmark, then
/// `<alias> logo` for up to five aliases.
pub fn company_search_queries(theme: &Theme) -> Vec<String> {
    let name = theme.name.trim();
    let mut queries = vec![
        format!("{name} logo"),
        format!("{name} company logo"),
        format!("{name} wordmark"),
    ];
    queries.extend(
        theme
            .aliases
            .iter()
            .filter(|a| !a.is_empty())
            .take(5)
            .filter(|a| !a.eq_ignore_ascii_case(name))
            .map(|a| format!("{a} logo")),
    );

    let mut seen = HashSet::new();
    queries
        .into_iter()
        .filter(|q| {
            let key = normalize_space(q).to_lowercase();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Static logo endpoints for a domain, smallest first.
fn domain_logo_urls(domain: &str) -> Vec<String> {
    let mut urls: Vec<String> = [64, 96, 128, 192, 256, 384, 512]
        .iter()
        .flat_map(|size| {
            [
                format!("https://logo.clearbit.com/{domain}?size={size}"),
                format!("https://www.google.com/s2/favicons?domain_url={domain}&sz={size}"),
            ]
        })
        .collect();
    urls.push(format!("https://icons.duckduckgo.com/ip3/{domain}.ico"));
    urls
}

/// Photo endpoints that do not need a search API: Unsplash and LoremFlickr
/// seeded by the theme, then Picsum filler.
fn photo_candidate_urls(theme: &Theme, queries: &[String]) -> Vec<String> {
    let seed_base = hex_window(&sha256_hex(theme.id.as_bytes()), 0, 8) % 10_000;
    let mut urls = Vec::new();
    for (i, query) in queries.iter().take(4).enumerate() {
        let q = urlencoding::encode(query);
        let sig = seed_base + i as u64;
        urls.push(format!("https://source.unsplash.com/1600x900/?{q}&sig={sig}"));
        urls.push(format!("https://loremflickr.com/1600/900/{q},technology?lock={sig}"));
    }
    for i in 1..=24 {
        let seed = urlencoding::encode(&format!("{}-{i}", theme.id)).into_owned();
        urls.push(format!("https://picsum.photos/seed/{seed}/1400/900"));
    }
    urls
}

/// Build the decorated candidate list, deduplicated and capped at `max_urls`.
pub async fn candidate_urls<F: ImageFetcher>(
    fetcher: &F,
    theme: &Theme,
    max_urls: usize,
    timeout: Duration,
) -> Vec<String> {
    let queries = company_search_queries(theme);
    let mut urls: Vec<String> = Vec::new();

    for query in queries.iter().take(3) {
        match fetcher.search_image_urls(query, 12, timeout).await {
            Ok(found) => urls.extend(found),
            Err(e) if e.is_rejection() => debug!(%query, error = %e, "Commons search skipped"),
            Err(e) => warn!(%query, error = %e, "Commons search failed"),
        }
        if urls.len() >= max_urls {
            break;
        }
    }
    if let Some(domain) = theme.logo_domain.as_deref() {
        urls.extend(domain_logo_urls(domain));
    }
    urls.extend(photo_candidate_urls(theme, &queries));

    let mut seen = HashSet::new();
    urls.iter()
        .filter_map(|u| sanitize_url(u))
        .filter(|u| seen.insert(u.to_string()))
        .take(max_urls)
        .map(str::to_string)
        .collect()
}

/// Grow the on-disk pool for `theme` towards `target` entries.
///
/// Returns the number of files added. Downloads whose content hash is
/// already in the pool are skipped.
#[instrument(level = "info", skip_all, fields(theme = %theme.id, target_count = target))]
pub async fn populate_pool<F: ImageFetcher>(
    fetcher: &F,
    settings: &CoverSettings,
    theme: &Theme,
    target: usize,
) -> usize {
    let existing = discover_local(&settings.pool_dir, &theme.id);
    if existing.len() >= target {
        return 0;
    }
    let mut known: HashSet<String> = HashSet::new();
    for path in &existing {
        if let Ok(bytes) = fs::read(path).await {
            known.insert(sha256_hex(&bytes));
        }
    }

    let missing = target - existing.len();
    let max_attempts = (missing * 8).clamp(18, 60);
    let timeout = settings.candidate_timeout();
    let out_dir = settings.pool_dir.join(&theme.id);
    let mut added = 0usize;

    for url in candidate_urls(fetcher, theme, max_attempts, timeout).await {
        if existing.len() + added >= target {
            break;
        }
        let image = match fetcher.fetch_image(&url, timeout, MIN_CANDIDATE_BYTES).await {
            Ok(image) => image,
            Err(e) if e.is_rejection() => {
                debug!(%url, error = %e, "Pool candidate rejected");
                continue;
            }
            Err(e) => {
                warn!(%url, error = %e, "Pool candidate fetch failed");
                continue;
            }
        };
        let digest = sha256_hex(&image.bytes);
        if known.contains(&digest) {
            continue;
        }

        let path = out_dir.join(format!("auto-{}{}", &digest[..14], image.extension(&url)));
        if !path.exists() {
            if let Err(e) = fs::create_dir_all(&out_dir).await {
                warn!(dir = %out_dir.display(), error = %e, "Cannot create pool directory");
                break;
            }
            if let Err(e) = fs::write(&path, &image.bytes).await {
                warn!(path = %path.display(), error = %e, "Cannot store pool image");
                continue;
            }
        }
        known.insert(digest);
        added += 1;
    }

    info!(added, existing = existing.len(), "Pool population finished");
    added
}

/// Inline brand logo from the first endpoint that returns a non-trivial
/// image, cached per theme for the run.
pub async fn logo_data_uri<F: ImageFetcher>(
    fetcher: &F,
    ctx: &mut RunContext,
    theme: &Theme,
) -> Option<String> {
    if let Some(cached) = ctx.logo_cache.get(&theme.id) {
        return cached.clone();
    }
    let mut found = None;
    if let Some(domain) = theme.logo_domain.as_deref() {
        let endpoints = [
            format!("https://logo.clearbit.com/{domain}?size=512"),
            format!("https://logo.clearbit.com/{domain}?size=256"),
            format!("https://www.google.com/s2/favicons?domain_url={domain}&sz=256"),
            format!("https://icons.duckduckgo.com/ip3/{domain}.ico"),
        ];
        for url in &endpoints {
            match fetcher.fetch_image(url, LOGO_TIMEOUT, MIN_LOGO_BYTES).await {
                Ok(image) => {
                    found = Some(data_uri(logo_mime_for_url(url), &image.bytes));
                    break;
                }
                Err(e) if e.is_rejection() => debug!(%url, error = %e, "Logo endpoint rejected"),
                Err(e) => warn!(%url, error = %e, "Logo endpoint failed"),
            }
        }
    }
    ctx.logo_cache.insert(theme.id.clone(), found.clone());
    found
}

/// Write `count` brand variant SVGs, keeping any that already exist.
pub async fn generate_variants(
    dir: &Path,
    theme: &Theme,
    logo_href: &str,
    count: usize,
) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).await?;
    let mut paths = Vec::with_capacity(count);
    for i in 1..=count {
        let path = dir.join(format!("{}-v{i}.svg", theme.id));
        if !path.exists() {
            fs::write(&path, brand_variant_svg(theme, logo_href, i)).await?;
        }
        paths.push(path);
    }
    Ok(paths)
}

/// Assemble (or reuse) the variant pool for `theme`.
#[instrument(level = "debug", skip_all, fields(theme = %theme.id))]
pub async fn ensure_pool<F: ImageFetcher>(
    fetcher: &F,
    settings: &CoverSettings,
    ctx: &mut RunContext,
    theme: &Theme,
) -> Option<VariantPool> {
    match ctx.pools.get(&theme.id) {
        Some(Some(pool)) if pool.all_exist() => return Some(pool.clone()),
        Some(None) => return None,
        _ => {}
    }
    let pool = build_pool(fetcher, settings, ctx, theme).await;
    ctx.pools.insert(theme.id.clone(), pool.clone());
    pool
}

async fn build_pool<F: ImageFetcher>(
    fetcher: &F,
    settings: &CoverSettings,
    ctx: &mut RunContext,
    theme: &Theme,
) -> Option<VariantPool> {
    if settings.local_pool {
        let mut local = discover_local(&settings.pool_dir, &theme.id);
        let mut added = 0;
        if settings.search_enabled && local.len() < settings.search_target {
            added = populate_pool(fetcher, settings, theme, settings.search_target).await;
            if added > 0 {
                local = discover_local(&settings.pool_dir, &theme.id);
            }
        }
        if !local.is_empty() {
            let searched = added > 0
                || local.iter().any(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("auto-"))
                });
            let source = if searched { PoolSource::SearchedPool } else { PoolSource::LocalPool };
            debug!(count = local.len(), source = source.tag(), "Using on-disk pool");
            return Some(VariantPool { entries: local, source });
        }
    }

    let logo_href = match logo_data_uri(fetcher, ctx, theme).await {
        Some(uri) => uri,
        None => theme.logo_url()?,
    };
    let dir = settings.image_dir.join("company_variants");
    match generate_variants(&dir, theme, &logo_href, settings.variant_count).await {
        Ok(entries) => Some(VariantPool { entries, source: PoolSource::GeneratedLogoVariants }),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot write brand variants");
            None
        }
    }
}

/// A selected pool entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedVariant {
    pub path: PathBuf,
    /// Zero-based position in the pool.
    pub index: usize,
}

impl PickedVariant {
    pub fn reference(&self) -> String {
        to_web_path(&self.path)
    }

    /// One-based variant number used in provenance tags.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Stable pool index for `(theme, day, key)`.
///
/// `key` is the item uid, else its title, else the day itself.
pub fn daily_index(theme_id: &str, day: NaiveDate, key: &str, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let day = day.format("%Y-%m-%d").to_string();
    let key = if key.is_empty() { day.as_str() } else { key };
    let digest = sha256_hex(format!("{theme_id}|{day}|{key}").as_bytes());
    (hex_window(&digest, 0, 12) % len as u64) as usize
}

/// Uniform pick in `0..len` avoiding `last` when there is a choice.
pub fn random_index_excluding(len: usize, last: Option<usize>) -> usize {
    let candidates: Vec<usize> = (0..len)
        .filter(|&i| len == 1 || Some(i) != last)
        .collect();
    if candidates.is_empty() {
        return 0;
    }
    candidates[rand::rng().random_range(0..candidates.len())]
}

/// Choose one entry of `pool` for an item.
pub fn pick_variant(
    settings: &CoverSettings,
    ctx: &mut RunContext,
    theme_id: &str,
    pool: &VariantPool,
    uid: &str,
    title: &str,
) -> Option<PickedVariant> {
    if pool.is_empty() {
        return None;
    }
    let index = if settings.daily_rotation {
        let key = if uid.is_empty() { title } else { uid };
        daily_index(theme_id, ctx.today(), key, pool.len())
    } else {
        let last = ctx.last_pick.get(theme_id).copied();
        let index = random_index_excluding(pool.len(), last);
        ctx.last_pick.insert(theme_id.to_string(), index);
        index
    };
    pool.entries
        .get(index)
        .map(|path| PickedVariant { path: path.clone(), index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covers::catalog::Catalog;
    use crate::http::testing::{StubFetcher, fake_png};

    fn settings_in(root: &Path) -> CoverSettings {
        CoverSettings {
            image_dir: root.join("generated"),
            pool_dir: root.join("pool"),
            ..Default::default()
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[test]
    fn test_order_key() {
        let mut names = vec![
            "samsung/auto-00aa11bb22cc33.png",
            "samsung-v10.png",
            "samsung_hero.jpg",
            "samsung-v2.png",
            "samsung/3-dark.webp",
            "samsung-v1.svg",
        ];
        names.sort_by_cached_key(|n| order_key(Path::new(n)));
        assert_eq!(
            names,
            vec![
                "samsung-v1.svg",
                "samsung-v2.png",
                "samsung/3-dark.webp",
                "samsung-v10.png",
                "samsung_hero.jpg",
                "samsung/auto-00aa11bb22cc33.png",
            ]
        );
    }

    #[test]
    fn test_discover_local_layouts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("kakao")).unwrap();
        std::fs::write(root.join("kakao-v2.png"), b"x").unwrap();
        std::fs::write(root.join("kakao_v1.jpg"), b"x").unwrap();
        std::fs::write(root.join("kakao-notes.txt"), b"x").unwrap();
        std::fs::write(root.join("kakaobank-v1.png"), b"x").unwrap();
        std::fs::write(root.join("kakao").join("v3.webp"), b"x").unwrap();

        let found: Vec<String> = discover_local(root, "kakao")
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["kakao_v1.jpg", "kakao-v2.png", "v3.webp"]);
        assert!(discover_local(&root.join("missing"), "kakao").is_empty());
    }

    #[test]
    fn test_company_search_queries() {
        let theme = Catalog::builtin().company("pearlabyss").unwrap();
        let queries = company_search_queries(theme);
        assert_eq!(
            queries,
            vec![
                "Pearl Abyss logo",
                "Pearl Abyss company logo",
                "Pearl Abyss wordmark",
                "pearlabyss logo",
                "펄어비스 logo",
            ]
        );
    }

    #[test]
    fn test_daily_index_is_pure_and_covers_every_index() {
        let a = daily_index("samsung", day(), "https://x/1", 7);
        let b = daily_index("samsung", day(), "https://x/1", 7);
        assert_eq!(a, b);
        assert!(a < 7);

        let seen: HashSet<usize> =
            (0..200).map(|i| daily_index("samsung", day(), &format!("uid-{i}"), 5)).collect();
        assert_eq!(seen.len(), 5);
        assert_eq!(daily_index("samsung", day(), "", 0), 0);
    }

    #[test]
    fn test_random_pick_avoids_previous() {
        for _ in 0..50 {
            let i = random_index_excluding(3, Some(1));
            assert_ne!(i, 1);
        }
        assert_eq!(random_index_excluding(1, Some(0)), 0);
    }

    #[tokio::test]
    async fn test_local_pool_is_preferred() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings { search_enabled: false, ..settings_in(tmp.path()) };
        std::fs::create_dir_all(&settings.pool_dir).unwrap();
        std::fs::write(settings.pool_dir.join("samsung-v1.png"), fake_png(1, 600)).unwrap();
        std::fs::write(settings.pool_dir.join("samsung-v2.png"), fake_png(2, 600)).unwrap();

        let theme = Catalog::builtin().company("samsung").unwrap();
        let stub = StubFetcher::new();
        let mut ctx = RunContext::for_date(true, day());
        let pool = ensure_pool(&stub, &settings, &mut ctx, theme).await.unwrap();
        assert_eq!(pool.source, PoolSource::LocalPool);
        assert_eq!(pool.len(), 2);
        assert_eq!(stub.call_count(), 0);

        let again = ensure_pool(&stub, &settings, &mut ctx, theme).await.unwrap();
        assert_eq!(again, pool);
    }

    #[tokio::test]
    async fn test_remote_population_persists_auto_files() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings { search_target: 3, ..settings_in(tmp.path()) };
        let theme = Catalog::builtin().company("kakao").unwrap();
        let stub = StubFetcher::new()
            .with_search(
                "Kakao logo",
                &["https://upload.wikimedia.org/a.png", "https://upload.wikimedia.org/b.png"],
            )
            .with_image("https://upload.wikimedia.org/a.png", "image/png", fake_png(1, 400))
            .with_image("https://upload.wikimedia.org/b.png", "image/png", fake_png(1, 400))
            .with_image("https://logo.clearbit.com/kakao.com?size=64", "image/png", fake_png(9, 90))
            .with_image("https://logo.clearbit.com/kakao.com?size=96", "image/png", fake_png(5, 40));

        let mut ctx = RunContext::for_date(true, day());
        let pool = ensure_pool(&stub, &settings, &mut ctx, theme).await.unwrap();
        assert_eq!(pool.source, PoolSource::SearchedPool);
        assert_eq!(pool.len(), 2);
        for path in &pool.entries {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("auto-"));
            assert_eq!(name.len(), "auto-".len() + 14 + ".png".len());
            assert!(path.starts_with(settings.pool_dir.join("kakao")));
        }
    }

    #[tokio::test]
    async fn test_generated_variants_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings {
            search_enabled: false,
            variant_count: 3,
            ..settings_in(tmp.path())
        };
        let theme = Catalog::builtin().company("nvidia").unwrap();
        let stub = StubFetcher::new().with_image(
            "https://logo.clearbit.com/nvidia.com?size=256",
            "image/png",
            fake_png(3, 500),
        );
        let mut ctx = RunContext::for_date(true, day());
        let pool = ensure_pool(&stub, &settings, &mut ctx, theme).await.unwrap();
        assert_eq!(pool.source, PoolSource::GeneratedLogoVariants);
        assert_eq!(pool.len(), 3);
        let svg = std::fs::read_to_string(&pool.entries[0]).unwrap();
        assert!(svg.contains("data:image/png;base64,"));
        assert!(pool.entries[2].ends_with("company_variants/nvidia-v3.svg"));

        // The logo lookup is cached for the run.
        let calls = stub.call_count();
        assert!(logo_data_uri(&stub, &mut ctx, theme).await.is_some());
        assert_eq!(stub.call_count(), calls);
    }

    #[tokio::test]
    async fn test_no_pool_without_domain() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings { search_enabled: false, ..settings_in(tmp.path()) };
        let theme = Theme::inferred("Rivian");
        let stub = StubFetcher::new();
        let mut ctx = RunContext::for_date(true, day());
        assert!(ensure_pool(&stub, &settings, &mut ctx, &theme).await.is_none());
        assert!(ensure_pool(&stub, &settings, &mut ctx, &theme).await.is_none());
    }

    #[test]
    fn test_pick_variant_daily_rotation() {
        let settings = CoverSettings::default();
        let mut ctx = RunContext::for_date(true, day());
        let pool = VariantPool {
            entries: (1..=4).map(|i| PathBuf::from(format!("p/samsung-v{i}.png"))).collect(),
            source: PoolSource::LocalPool,
        };
        let a = pick_variant(&settings, &mut ctx, "samsung", &pool, "uid-1", "t").unwrap();
        let b = pick_variant(&settings, &mut ctx, "samsung", &pool, "uid-1", "other").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.index, daily_index("samsung", day(), "uid-1", 4));
        assert_eq!(a.number(), a.index + 1);
        assert!(a.reference().starts_with("p/samsung-v"));
    }

    #[tokio::test]
    async fn test_pool_rebuilt_after_file_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings {
            search_enabled: false,
            variant_count: 3,
            ..settings_in(tmp.path())
        };
        let theme = Catalog::builtin().company("nvidia").unwrap();
        let stub = StubFetcher::new();
        let mut ctx = RunContext::for_date(true, day());

        let pool = ensure_pool(&stub, &settings, &mut ctx, theme).await.unwrap();
        assert!(pool.all_exist());
        std::fs::remove_file(&pool.entries[1]).unwrap();

        let rebuilt = ensure_pool(&stub, &settings, &mut ctx, theme).await.unwrap();
        assert_eq!(rebuilt.entries, pool.entries);
        assert!(rebuilt.entries[1].exists());
    }

    #[tokio::test]
    async fn test_failed_pool_is_not_retried_in_run() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("generated");
        std::fs::write(&blocker, b"file, not a dir").unwrap();
        let settings = CoverSettings { search_enabled: false, ..settings_in(tmp.path()) };
        let theme = Catalog::builtin().company("tesla").unwrap();
        let stub = StubFetcher::new();
        let mut ctx = RunContext::for_date(true, day());

        assert!(ensure_pool(&stub, &settings, &mut ctx, theme).await.is_none());
        assert_eq!(ctx.pools.get("tesla"), Some(&None));

        // Writable again, but the failure stands for the rest of the run.
        std::fs::remove_file(&blocker).unwrap();
        let calls = stub.call_count();
        assert!(ensure_pool(&stub, &settings, &mut ctx, theme).await.is_none());
        assert_eq!(stub.call_count(), calls);
        assert!(!settings.image_dir.join("company_variants").exists());
    }

    #[test]
    fn test_pick_variant_random_never_repeats_last() {
        let settings = CoverSettings { daily_rotation: false, ..Default::default() };
        let mut ctx = RunContext::for_date(true, day());
        let pool = VariantPool {
            entries: (1..=3).map(|i| PathBuf::from(format!("p/samsung-v{i}.png"))).collect(),
            source: PoolSource::LocalPool,
        };

        let mut previous = None;
        for _ in 0..40 {
            let picked = pick_variant(&settings, &mut ctx, "samsung", &pool, "uid-1", "t").unwrap();
            assert_ne!(Some(picked.index), previous);
            assert_eq!(ctx.last_pick.get("samsung"), Some(&picked.index));
            previous = Some(picked.index);
        }

        // Last picks are tracked per theme.
        let other = pick_variant(&settings, &mut ctx, "kakao", &pool, "uid-1", "t").unwrap();
        assert_eq!(ctx.last_pick.get("kakao"), Some(&other.index));
        assert_eq!(ctx.last_pick.get("samsung"), previous.as_ref());
    }
}
