//! The cover resolver: one image per item, never failing.

use super::matcher::{ThemeMatch, ThemeMatcher};
use super::pool::{PickedVariant, VariantPool, ensure_pool, pick_variant};
use super::render::{data_uri, illustration_svg};
use super::rights::{self, RightsPolicy};
use super::stock::{download_stock, generic_stock_urls, keyword_photo_prompt, keyword_stock_urls};
use super::{CoverSettings, RunContext};
use crate::api::{ImageGenerator, fallback_prompt};
use crate::http::ImageFetcher;
use crate::models::{ImageProvider, ItemOrigin, NewsItem, ResolvedImage};
use crate::utils::{sanitize_url, sha256_hex, slugify, to_web_path, truncate_for_log};
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument, warn};

/// Applies the fallback tiers in fixed precedence.
pub struct CoverResolver<'a, F, G> {
    settings: &'a CoverSettings,
    matcher: &'a ThemeMatcher,
    rights: &'a RightsPolicy,
    fetcher: &'a F,
    generator: &'a G,
}

impl<'a, F: ImageFetcher, G: ImageGenerator> CoverResolver<'a, F, G> {
    pub fn new(
        settings: &'a CoverSettings,
        matcher: &'a ThemeMatcher,
        rights: &'a RightsPolicy,
        fetcher: &'a F,
        generator: &'a G,
    ) -> Self {
        Self { settings, matcher, rights, fetcher, generator }
    }

    /// Resolve the cover for `item`.
    ///
    /// `prompt_hint` is the curated image prompt, used only by the AI tier.
    /// The returned image reference is never empty.
    #[instrument(
        level = "info",
        skip_all,
        fields(source = %item.source_name, title = %truncate_for_log(&item.title, 48))
    )]
    pub async fn resolve(
        &self,
        ctx: &mut RunContext,
        item: &NewsItem,
        prompt_hint: Option<&str>,
    ) -> ResolvedImage {
        if let Some(found) = self.source_image(ctx, item) {
            debug!(provider = %found.provider, "Using source image");
            return found;
        }

        let text = format!("{} {}", item.title, item.context).trim().to_string();
        if self.settings.brand_priority {
            if let Some(hit) = self.matcher.match_company(&text) {
                if let Some(found) = self.brand_image(ctx, item, &hit).await {
                    debug!(theme = %hit.theme.id, provider = %found.provider, "Using brand image");
                    return found;
                }
            }
        }

        let topic = self.matcher.match_topical(&text);
        let stem = self.asset_stem(item);

        if let Some(found) = self.generated_image(ctx, item, prompt_hint, topic.as_ref(), &stem).await {
            return found;
        }
        if let Some(found) = self.stock_image(ctx, item, topic.as_ref(), &stem).await {
            return found;
        }
        self.illustration(item, topic.as_ref(), &stem).await
    }

    /// Tier 1: the item's own image, if rights allow and it is unused.
    fn source_image(&self, ctx: &mut RunContext, item: &NewsItem) -> Option<ResolvedImage> {
        if !self.settings.use_source_image || item.origin == ItemOrigin::Api {
            return None;
        }
        let url = sanitize_url(item.source_image_url.as_deref()?)?;
        let feed_allows = item.feed_rights.as_deref().is_some_and(rights::feed_allows);
        let allowed = self.rights.should_use_source_image(
            &item.source_name,
            Some(url),
            feed_allows,
            item.item_rights.as_deref(),
        );
        if !allowed || !ctx.dedup.claim_url(url) {
            return None;
        }
        let (prompt, provider) = match item.origin {
            ItemOrigin::ListPage => ("original-source-image", ImageProvider::SourceOriginal),
            _ => ("rss-image-direct-use", ImageProvider::RssSourceImage),
        };
        Some(ResolvedImage { image: url.to_string(), prompt: prompt.to_string(), provider })
    }

    /// Tier 2: a variant from the brand pool, else the bare logo URL.
    async fn brand_image(
        &self,
        ctx: &mut RunContext,
        item: &NewsItem,
        hit: &ThemeMatch<'_>,
    ) -> Option<ResolvedImage> {
        let theme = hit.theme.as_ref();
        if let Some(pool) = ensure_pool(self.fetcher, self.settings, ctx, theme).await {
            if let Some(picked) =
                pick_variant(self.settings, ctx, &theme.id, &pool, &item.uid, &item.title)
            {
                let picked = claim_variant(ctx, &pool, picked);
                return Some(ResolvedImage {
                    image: picked.reference(),
                    prompt: format!(
                        "{}:{}:{}:v{}",
                        pool.source.tag(),
                        theme.id,
                        hit.alias,
                        picked.number()
                    ),
                    provider: pool.source.provider(),
                });
            }
        }

        let logo = theme.logo_url()?;
        // Recorded for the run, but a repeated logo is still better than no brand.
        ctx.dedup.claim_url(&logo);
        Some(ResolvedImage {
            image: logo,
            prompt: format!("company-logo:{}:{}", theme.id, hit.alias),
            provider: ImageProvider::CompanyLogo,
        })
    }

    /// Tier 3a: a generated image, within the per-run budget.
    ///
    /// Without a curated prompt, a matched topic supplies a photo prompt
    /// built from its subject.
    async fn generated_image(
        &self,
        ctx: &mut RunContext,
        item: &NewsItem,
        prompt_hint: Option<&str>,
        topic: Option<&ThemeMatch<'_>>,
        stem: &str,
    ) -> Option<ResolvedImage> {
        if !self.generator.is_enabled() || ctx.ai_images >= self.settings.ai_image_limit {
            return None;
        }
        ctx.ai_images += 1;

        let prompt = prompt_hint
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or_else(|| topic.map(|hit| keyword_photo_prompt(&hit.theme, &hit.alias, &item.title)))
            .unwrap_or_else(|| fallback_prompt(&self.settings.image_style, &item.title, &item.source_name));
        let image = match self.generator.generate_image(&prompt).await {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "Image generation failed");
                return None;
            }
        };
        if ctx.dedup.is_claimed(&image.bytes) {
            return None;
        }
        let path = self.settings.image_dir.join(format!("{stem}-ai{}", image.extension("")));
        if let Err(e) = write_asset(&path, &image.bytes).await {
            warn!(path = %path.display(), error = %e, "Cannot store generated image");
            return None;
        }
        ctx.dedup.claim_bytes(&image.bytes);
        Some(ResolvedImage { image: to_web_path(&path), prompt, provider: ImageProvider::GeminiImage })
    }

    /// Tier 3b: a keyword stock photo.
    async fn stock_image(
        &self,
        ctx: &mut RunContext,
        item: &NewsItem,
        topic: Option<&ThemeMatch<'_>>,
        stem: &str,
    ) -> Option<ResolvedImage> {
        if !self.settings.keyword_stock {
            return None;
        }
        let representative = self.settings.representative_queries;
        let (urls, theme_id, keyword) = match topic {
            Some(hit) => (
                keyword_stock_urls(&hit.theme, &hit.alias, &item.uid, representative),
                hit.theme.id.as_str(),
                hit.alias.as_str(),
            ),
            None => (
                generic_stock_urls(&item.title, &item.source_name, &item.uid, representative),
                "general",
                "none",
            ),
        };
        let dir = &self.settings.image_dir;
        let path = download_stock(self.fetcher, self.settings, ctx, &urls, dir, stem).await?;
        Some(ResolvedImage {
            image: to_web_path(&path),
            prompt: format!("keyword-stock:{theme_id}:{keyword}"),
            provider: ImageProvider::KeywordStockPhoto,
        })
    }

    /// Tier 3c: the locally rendered illustration. Cannot fail.
    async fn illustration(
        &self,
        item: &NewsItem,
        topic: Option<&ThemeMatch<'_>>,
        stem: &str,
    ) -> ResolvedImage {
        let theme_id = topic.map(|t| t.theme.id.as_str()).unwrap_or("general");
        let keyword = topic.map(|t| t.alias.as_str()).unwrap_or("none");
        let prompt = format!("simple-illustration:{theme_id}:{keyword}");
        let svg = || {
            illustration_svg(
                topic.and_then(|t| t.theme.palette),
                &format!("{theme_id}|{}", item.title),
            )
        };

        let path = self.settings.image_dir.join(format!("{stem}-simple.svg"));
        let image = if path.exists() {
            to_web_path(&path)
        } else {
            match write_asset(&path, svg().as_bytes()).await {
                Ok(()) => to_web_path(&path),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot store illustration, inlining");
                    data_uri("image/svg+xml", svg().as_bytes())
                }
            }
        };
        ResolvedImage { image, prompt, provider: ImageProvider::SimpleIllustration }
    }

    /// `<slug>-<digest12>`, stable per (source, title, uid).
    fn asset_stem(&self, item: &NewsItem) -> String {
        let uid = if item.uid.is_empty() {
            format!("{}|{}", item.source_name, item.title)
        } else {
            item.uid.clone()
        };
        let digest = sha256_hex(format!("{}|{}|{uid}", item.source_name, item.title).as_bytes());
        format!("{}-{}", slugify(&item.title, 40), &digest[..12])
    }
}

/// Walk forward from the picked variant to the first one not yet used this
/// run; keep the original pick when all are used.
fn claim_variant(ctx: &mut RunContext, pool: &VariantPool, picked: PickedVariant) -> PickedVariant {
    let len = pool.len();
    for step in 0..len {
        let index = (picked.index + step) % len;
        let path = &pool.entries[index];
        if ctx.dedup.claim_file(path) {
            return PickedVariant { path: path.clone(), index };
        }
    }
    debug!(index = picked.index, "Every variant already used in this run");
    picked
}

async fn write_asset(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{NoImageGenerator, StubGenerator};
    use crate::covers::catalog::Catalog;
    use crate::http::testing::{StubFetcher, fake_png};
    use chrono::NaiveDate;

    fn settings_in(root: &Path) -> CoverSettings {
        CoverSettings {
            image_dir: root.join("generated"),
            pool_dir: root.join("pool"),
            search_enabled: false,
            ..Default::default()
        }
    }

    fn ctx() -> RunContext {
        RunContext::for_date(true, NaiveDate::from_ymd_opt(2025, 5, 6).unwrap())
    }

    fn matcher() -> ThemeMatcher {
        ThemeMatcher::new(Catalog::builtin().clone(), false)
    }

    fn feed_item(title: &str, image: Option<&str>) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            link: format!("https://news.example/{}", slugify(title, 40)),
            source_name: "TechCrunch".to_string(),
            source_image_url: image.map(str::to_string),
            item_rights: None,
            feed_rights: None,
            context: String::new(),
            origin: ItemOrigin::Feed,
            uid: format!("https://news.example/{}", slugify(title, 40)),
        }
    }

    #[tokio::test]
    async fn test_force_allowed_source_image_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings_in(tmp.path());
        let matcher = matcher();
        let rights = RightsPolicy::new(vec!["techcrunch".to_string()], Vec::new());
        let fetcher = StubFetcher::new();
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &NoImageGenerator);
        let mut ctx = ctx();

        let item = feed_item("Samsung unveils new chip", Some("https://img.example/a.jpg"));
        let got = resolver.resolve(&mut ctx, &item, None).await;
        assert_eq!(got.image, "https://img.example/a.jpg");
        assert_eq!(got.provider, ImageProvider::RssSourceImage);
        assert_eq!(got.prompt, "rss-image-direct-use");
        assert_eq!(fetcher.call_count(), 0);

        // Same URL again is a duplicate and falls through to later tiers.
        let again = resolver.resolve(&mut ctx, &item, None).await;
        assert_ne!(again.image, "https://img.example/a.jpg");
    }

    #[tokio::test]
    async fn test_unlicensed_source_image_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings { brand_priority: false, ..settings_in(tmp.path()) };
        let matcher = matcher();
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &NoImageGenerator);

        let mut item = feed_item("Cloud outage report", Some("https://img.example/b.jpg"));
        item.item_rights = Some("All Rights Reserved".to_string());
        let got = resolver.resolve(&mut ctx(), &item, None).await;
        assert_eq!(got.provider, ImageProvider::SimpleIllustration);
        assert_eq!(got.prompt, "simple-illustration:cloud:cloud");
    }

    #[tokio::test]
    async fn test_samsung_headline_uses_local_pool() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings_in(tmp.path());
        std::fs::create_dir_all(&settings.pool_dir).unwrap();
        for i in 1..=3u8 {
            std::fs::write(settings.pool_dir.join(format!("samsung-v{i}.png")), fake_png(i, 700))
                .unwrap();
        }
        let matcher = matcher();
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &NoImageGenerator);
        let mut ctx = ctx();

        let item = feed_item("Samsung unveils new chip", None);
        let got = resolver.resolve(&mut ctx, &item, None).await;
        assert_eq!(got.provider, ImageProvider::CompanyLocalImagePool);
        assert!(got.prompt.starts_with("company-local-pool:samsung:samsung:v"));
        assert!(got.image.contains("samsung-v"));

        // Three items, three distinct variants; the fourth reuses one.
        let mut seen = std::collections::HashSet::new();
        seen.insert(got.image);
        for title in ["Samsung earnings beat", "Samsung opens fab"] {
            let got = resolver.resolve(&mut ctx, &feed_item(title, None), None).await;
            assert_eq!(got.provider, ImageProvider::CompanyLocalImagePool);
            seen.insert(got.image);
        }
        assert_eq!(seen.len(), 3);
        let fourth = resolver.resolve(&mut ctx, &feed_item("Samsung hires", None), None).await;
        assert_eq!(fourth.provider, ImageProvider::CompanyLocalImagePool);
    }

    #[tokio::test]
    async fn test_brand_without_pool_uses_logo_url() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings { local_pool: false, ..settings_in(tmp.path()) };
        // Logo endpoints all fail, so variants are generated around the remote logo URL.
        let matcher = matcher();
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &NoImageGenerator);
        let got = resolver.resolve(&mut ctx(), &feed_item("Tesla recalls cars", None), None).await;
        assert_eq!(got.provider, ImageProvider::CompanyLogoVariant);
        assert!(got.prompt.starts_with("company-logo-variant:tesla:tesla:v"));

        let unwritable = CoverSettings {
            image_dir: tmp.path().join("blocker").join("x"),
            ..settings.clone()
        };
        std::fs::write(tmp.path().join("blocker"), b"file, not a dir").unwrap();
        let resolver =
            CoverResolver::new(&unwritable, &matcher, &rights, &fetcher, &NoImageGenerator);
        let got = resolver.resolve(&mut ctx(), &feed_item("Tesla recalls cars", None), None).await;
        assert_eq!(got.provider, ImageProvider::CompanyLogo);
        assert_eq!(got.image, "https://logo.clearbit.com/tesla.com?size=512");
        assert_eq!(got.prompt, "company-logo:tesla:tesla");
    }

    #[tokio::test]
    async fn test_unknown_brand_falls_back_to_illustration() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings { infer_company: true, ..settings_in(tmp.path()) };
        let matcher = ThemeMatcher::new(Catalog::builtin().clone(), true);
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &NoImageGenerator);

        let item = feed_item("Rivian cuts jobs", None);
        let got = resolver.resolve(&mut ctx(), &item, None).await;
        assert_eq!(got.provider, ImageProvider::SimpleIllustration);
        assert_eq!(got.prompt, "simple-illustration:general:none");
        assert!(got.image.ends_with("-simple.svg"));
        assert!(Path::new(&got.image).exists());
    }

    #[tokio::test]
    async fn test_illustration_inlines_when_unwritable() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("blocker"), b"file").unwrap();
        let settings = CoverSettings {
            image_dir: tmp.path().join("blocker").join("out"),
            brand_priority: false,
            ..settings_in(tmp.path())
        };
        let matcher = matcher();
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &NoImageGenerator);
        let got = resolver.resolve(&mut ctx(), &feed_item("Quiet day", None), None).await;
        assert_eq!(got.provider, ImageProvider::SimpleIllustration);
        assert!(got.image.starts_with("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn test_generated_image_respects_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings {
            ai_image_limit: 1,
            brand_priority: false,
            ..settings_in(tmp.path())
        };
        let matcher = matcher();
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let generator = StubGenerator::new(fake_png(4, 3000));
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &generator);
        let mut ctx = ctx();

        let got = resolver.resolve(&mut ctx, &feed_item("Robot arms", None), Some("a robot")).await;
        assert_eq!(got.provider, ImageProvider::GeminiImage);
        assert_eq!(got.prompt, "a robot");
        assert!(got.image.ends_with("-ai.png"));

        let next = resolver.resolve(&mut ctx, &feed_item("Robot legs", None), None).await;
        assert_eq!(next.provider, ImageProvider::SimpleIllustration);
        assert_eq!(ctx.ai_images(), 1);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_keyword_stock_tier() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings {
            keyword_stock: true,
            representative_queries: false,
            brand_priority: false,
            ..settings_in(tmp.path())
        };
        let matcher = matcher();
        let rights = RightsPolicy::default();
        let item = feed_item("Satellite launch delayed", None);
        let urls = keyword_stock_urls(
            Catalog::builtin().topic("space").unwrap(),
            "satellite",
            &item.uid,
            false,
        );
        let fetcher = StubFetcher::new().with_image(&urls[0], "image/jpeg", fake_png(8, 4096));
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &NoImageGenerator);

        let got = resolver.resolve(&mut ctx(), &item, None).await;
        assert_eq!(got.provider, ImageProvider::KeywordStockPhoto);
        assert_eq!(got.prompt, "keyword-stock:space:satellite");
        assert!(got.image.ends_with("-stock.jpg"));
    }

    #[tokio::test]
    async fn test_inferred_company_beats_topic_keyword() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings { infer_company: true, ..settings_in(tmp.path()) };
        std::fs::create_dir_all(&settings.pool_dir).unwrap();
        std::fs::write(settings.pool_dir.join("rivian-v1.png"), fake_png(5, 900)).unwrap();
        let matcher = ThemeMatcher::new(Catalog::builtin().clone(), true);
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &NoImageGenerator);

        let got = resolver.resolve(&mut ctx(), &feed_item("Rivian unveils AI chip", None), None).await;
        assert_eq!(got.provider, ImageProvider::CompanyLocalImagePool);
        assert_eq!(got.prompt, "company-local-pool:rivian:Rivian:v1");
    }

    #[tokio::test]
    async fn test_generated_prompt_from_topic_subject() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = CoverSettings {
            ai_image_limit: 2,
            brand_priority: false,
            ..settings_in(tmp.path())
        };
        let matcher = matcher();
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let generator = StubGenerator::new(fake_png(6, 3000));
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &generator);

        let got = resolver.resolve(&mut ctx(), &feed_item("Robot arms ship", None), None).await;
        assert_eq!(got.provider, ImageProvider::GeminiImage);
        assert!(got.prompt.starts_with(
            "Photorealistic editorial photo, a humanoid robot in an industrial workspace, topic: Robot arms ship, keyword: robot,"
        ));
        assert_eq!(generator.prompts.borrow()[0], got.prompt);

        // Nothing topical: the styled fallback prompt.
        let generic = resolver.resolve(&mut ctx(), &feed_item("Quiet day", None), None).await;
        assert_eq!(generic.provider, ImageProvider::GeminiImage);
        assert_eq!(generic.prompt, fallback_prompt(&settings.image_style, "Quiet day", "TechCrunch"));
    }

    #[tokio::test]
    async fn test_failed_generated_write_leaves_bytes_unclaimed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("blocker"), b"file").unwrap();
        let settings = CoverSettings {
            image_dir: tmp.path().join("blocker").join("out"),
            ai_image_limit: 1,
            brand_priority: false,
            ..settings_in(tmp.path())
        };
        let matcher = matcher();
        let rights = RightsPolicy::default();
        let fetcher = StubFetcher::new();
        let payload = fake_png(7, 3000);
        let generator = StubGenerator::new(payload.clone());
        let resolver = CoverResolver::new(&settings, &matcher, &rights, &fetcher, &generator);
        let mut ctx = ctx();

        let got = resolver.resolve(&mut ctx, &feed_item("Robot arms", None), Some("a robot")).await;
        assert_eq!(got.provider, ImageProvider::SimpleIllustration);
        assert_eq!(generator.calls(), 1);
        assert!(ctx.dedup.claim_bytes(&payload), "payload stays available after a failed write");
    }
}
