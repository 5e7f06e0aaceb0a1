//! # Awful News Covers
//!
//! A tech news collector that gathers headlines from a Korean portal, global
//! tech feeds and Hacker News, gives every item a short summary and exactly
//! one cover image, and merges the result into a JSON data file for a static
//! news viewer.
//!
//! ## Features
//!
//! - Scrapes the Naver News IT/Science list page and eight RSS/Atom feeds,
//!   and reads Hacker News top stories from its public API
//! - Optionally rewrites summaries and drafts cover prompts with Gemini
//! - Picks a cover per item: the source's own image when its rights allow,
//!   a company brand variant, a generated or stock photo, or a local SVG
//! - Never reuses the same image twice in one run
//! - Keeps a rolling window of previous runs in `news_data.json` and a
//!   `news_data.js` copy for `file://` viewing
//!
//! ## Usage
//!
//! ```sh
//! awful_news_covers -j ./site/news_data.json --js-output ./site/news_data.js
//! ```
//!
//! ## Architecture
//!
//! 1. **Collecting**: list page, feeds and API, one source at a time
//! 2. **Curating**: summary and image prompt per item (Hacker News items are
//!    summarized from their metadata instead)
//! 3. **Covering**: the cover resolver walks its fallback tiers per item
//! 4. **Output**: merge with the previous run and write JSON and JS files

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod covers;
mod error;
mod http;
mod models;
mod outputs;
mod scrapers;
mod utils;

use api::{AskAsync, Curator, GeminiImage, GeminiText, ImageGenerator, fallback_prompt};
use cli::Cli;
use covers::catalog::Catalog;
use covers::matcher::ThemeMatcher;
use covers::resolver::CoverResolver;
use covers::rights::{self, RightsPolicy};
use covers::RunContext;
use http::{HttpFetcher, ImageFetcher};
use models::{Curation, NewsItem, NewsRecord, Region};
use outputs::json::{self, TIMESTAMP_FORMAT};
use scrapers::{hackernews, naver, rss};
use utils::ensure_writable_dir;

/// Curate `item`, resolve its cover and build the persisted record.
async fn curated_record<A, F, G>(
    curator: &Curator<A>,
    resolver: &CoverResolver<'_, F, G>,
    ctx: &mut RunContext,
    region: Region,
    item: &NewsItem,
    collected_at: &str,
) -> NewsRecord
where
    A: AskAsync<Response = String>,
    F: ImageFetcher,
    G: ImageGenerator,
{
    let curation = curator.curate(&item.title, &item.context, &item.source_name).await;
    let image = resolver.resolve(ctx, item, Some(&curation.image_prompt)).await;
    NewsRecord::new(region, item, &curation, &image, collected_at)
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_covers starting up");

    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "No .env file loaded");
    }
    let args = Cli::parse();
    debug!(json_output = %args.json_output.display(), js_output = %args.js_output.display(), "Parsed CLI arguments");

    // Early check: every directory we write into must be writable
    let output_dir = args
        .json_output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    for dir in [output_dir, args.image_dir.as_path()] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }
    if let Err(e) = ensure_writable_dir(&args.pool_dir).await {
        warn!(path = %args.pool_dir.display(), error = %e, "Pool directory is not writable; brand pools will be read-only");
    }

    // ---- Cover pipeline setup ----
    let catalog = match &args.catalog_extension {
        Some(path) => match Catalog::load_extra(path) {
            Ok(extra) => {
                info!(path = %path.display(), entries = extra.len(), "Loaded catalog extension");
                Catalog::with_extra(extra)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load catalog extension; using built-in catalog");
                Catalog::builtin().clone()
            }
        },
        None => Catalog::builtin().clone(),
    };
    let settings = args.cover_settings();
    let matcher = ThemeMatcher::new(catalog, settings.infer_company);
    let policy: RightsPolicy = args.rights_policy();
    let fetcher = HttpFetcher::new()?;
    let client = fetcher.client().clone();

    let key = args.gemini_key();
    let curator = Curator::new(
        key.map(|k| GeminiText::new(client.clone(), k, &args.curation_model)),
        &args.curation_model,
        args.curation_enabled,
        args.curation_limit,
        &settings.image_style,
    );
    let generator = GeminiImage::new(client.clone(), key.unwrap_or_default(), &args.image_model);
    let resolver = CoverResolver::new(&settings, &matcher, &policy, &fetcher, &generator);
    let mut ctx = RunContext::new(settings.dedup_in_run);

    match key {
        None => info!("GEMINI_API_KEY not set; local SVG covers will be generated"),
        Some(_) => {
            info!(ai_image_limit = settings.ai_image_limit, "Gemini key detected");
            if args.curation_enabled {
                let limit = if args.curation_limit == 0 {
                    "unlimited".to_string()
                } else {
                    args.curation_limit.to_string()
                };
                info!(model = %args.curation_model, %limit, "News curation enabled");
            }
        }
    }

    let now = Local::now().naive_local();
    let collected_at = now.format(TIMESTAMP_FORMAT).to_string();
    let previous = json::load_existing(&args.json_output).await;
    let retained = json::retain_recent(previous, now, args.retention_days);
    info!(count = retained.len(), days = args.retention_days, "Retained previous records");

    let mut records: Vec<NewsRecord> = Vec::new();

    // ---- Domestic: Naver list page ----
    match naver::fetch_items(&client).await {
        Ok(items) => {
            for item in &items {
                records.push(
                    curated_record(&curator, &resolver, &mut ctx, Region::Domestic, item, &collected_at).await,
                );
            }
        }
        Err(e) => error!(source = naver::SECTION_URL, error = %e, "Domestic collection failed"),
    }

    // ---- Global: tech feeds ----
    for (source, url) in rss::GLOBAL_FEEDS {
        info!(%source, "Collecting global feed");
        let feed = rss::fetch_feed(&client, source, url).await;
        let feed_allows = feed.rights.combined().is_some_and(|r| rights::feed_allows(&r));
        info!(%source, policy = policy.note_for(source, feed_allows).as_str(), "Feed image policy");

        for item in feed.into_items(source) {
            records.push(
                curated_record(&curator, &resolver, &mut ctx, Region::Global, &item, &collected_at).await,
            );
        }
    }

    // ---- Global: Hacker News ----
    match hackernews::index_stories(&client).await {
        Ok(ids) => {
            for story in hackernews::fetch_stories(&client, ids).await {
                let item = story.to_item();
                let curation = Curation {
                    summary: story.summary(),
                    image_prompt: fallback_prompt(&settings.image_style, &item.title, &item.source_name),
                    model: String::new(),
                    mode: "api-metadata".to_string(),
                };
                let image = resolver.resolve(&mut ctx, &item, None).await;
                records.push(NewsRecord::new(Region::Global, &item, &curation, &image, &collected_at));
            }
        }
        Err(e) => error!(source = hackernews::SOURCE_NAME, error = %e, "Hacker News collection failed"),
    }

    info!(
        collected = records.len(),
        curated = curator.used(),
        ai_images = ctx.ai_images(),
        claimed = ctx.dedup.len(),
        "Collection complete"
    );

    // ---- Output ----
    let merged = json::merge(records, retained);
    let domestic = merged.iter().filter(|r| r.is_domestic()).count();
    let global = merged.iter().filter(|r| r.is_global()).count();

    if let Err(e) = json::write_outputs(&merged, &args.json_output, &args.js_output).await {
        error!(error = %e, "Failed to write output files");
        return Err(e);
    }
    info!(total = merged.len(), domestic, global, "Wrote news data");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
