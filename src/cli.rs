//! Command-line interface definitions for the news cover collector.
//!
//! Every option can also be supplied through the environment variable named
//! in its `env` attribute; a `.env` file in the working directory is loaded
//! before parsing. Boolean switches take an explicit value
//! (`--dedup-in-run false`, `IMAGE_DEDUP_IN_RUN=0`).

use crate::api::{DEFAULT_CURATION_MODEL, DEFAULT_IMAGE_MODEL};
use crate::covers::rights::RightsPolicy;
use crate::covers::{CoverSettings, DEFAULT_IMAGE_STYLE};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Floor for network timeouts given in seconds.
const MIN_TIMEOUT_SECS: u64 = 5;

/// Command-line arguments for the collector.
///
/// # Examples
///
/// ```sh
/// # Defaults: writes news_data.json and news_data.js in the working directory
/// awful_news_covers
///
/// # Curated summaries plus up to three generated covers
/// GEMINI_API_KEY=... awful_news_covers --ai-image-limit 3
///
/// # Reuse feed images from a licensed source, never from another
/// awful_news_covers --force-allow-sources "OpenAI Blog" --force-deny-sources Wired
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Merged JSON output file
    #[arg(short, long, env = "NEWS_JSON_OUTPUT", default_value = "news_data.json")]
    pub json_output: PathBuf,

    /// JavaScript output file (`window.NEWS_DATA = ...;`)
    #[arg(long, env = "NEWS_JS_OUTPUT", default_value = "news_data.js")]
    pub js_output: PathBuf,

    /// Directory for generated covers and downloaded images
    #[arg(long, env = "NEWS_IMAGE_DIR", default_value = "generated_images")]
    pub image_dir: PathBuf,

    /// Root of the per-company image pools
    #[arg(long, env = "COMPANY_IMAGE_POOL_DIR", default_value = "company_images")]
    pub pool_dir: PathBuf,

    /// Optional YAML list of extra company catalog entries
    #[arg(short, long, env = "COMPANY_CATALOG_EXTENSION")]
    pub catalog_extension: Option<PathBuf>,

    /// Days of previously collected items to keep in the JSON output
    #[arg(long, env = "NEWS_RETENTION_DAYS", default_value_t = 7)]
    pub retention_days: i64,

    /// Never use the same image twice in one run
    #[arg(long, env = "IMAGE_DEDUP_IN_RUN", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub dedup_in_run: bool,

    /// Prefer company brand images over topical fallbacks
    #[arg(long, env = "COMPANY_LOGO_PRIORITY_MODE", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub brand_priority: bool,

    /// Reuse source images when their rights allow it
    #[arg(long, env = "USE_RSS_SOURCE_IMAGE", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub use_source_image: bool,

    /// Build brand pools from local files (and remote search)
    #[arg(long, env = "COMPANY_LOCAL_IMAGE_MODE", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub local_pool: bool,

    /// Grow brand pools from Wikimedia Commons and photo endpoints
    #[arg(long, env = "COMPANY_SEARCH_IMAGE_ENABLED", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub search_enabled: bool,

    /// Desired brand pool size (clamped to 3..=20)
    #[arg(long, env = "COMPANY_SEARCH_IMAGE_TARGET", default_value_t = 10)]
    pub search_target: usize,

    /// Brand search timeout in seconds (at least 5)
    #[arg(long, env = "COMPANY_SEARCH_TIMEOUT", default_value_t = 12)]
    pub search_timeout: u64,

    /// Generated brand variants (clamped to 1..=5)
    #[arg(long, env = "COMPANY_VARIANT_COUNT", default_value_t = 5)]
    pub variant_count: usize,

    /// Pick brand variants by date instead of at random
    #[arg(long, env = "COMPANY_DAILY_ROTATION", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub daily_rotation: bool,

    /// Treat the first capitalized word of an English title as a company
    #[arg(long, env = "COMPANY_INFER_FROM_ENGLISH_TITLE", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub infer_company: bool,

    /// Download keyword stock photos before falling back to illustrations
    #[arg(long, env = "KEYWORD_STOCK_ENABLED", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub keyword_stock: bool,

    /// Stock photo timeout in seconds (at least 5)
    #[arg(long, env = "KEYWORD_STOCK_TIMEOUT", default_value_t = 20)]
    pub stock_timeout: u64,

    /// Smallest accepted stock photo in bytes
    #[arg(long, env = "MIN_STOCK_IMAGE_BYTES", default_value_t = 1500)]
    pub min_stock_bytes: usize,

    /// Query Unsplash with representative keywords
    #[arg(long, env = "KEYWORD_REPRESENTATIVE_QUERY_ENABLED", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub representative_queries: bool,

    /// Sources whose images are always reused (comma separated)
    #[arg(long, env = "RSS_IMAGE_FORCE_ALLOW_SOURCES", value_delimiter = ',')]
    pub force_allow_sources: Vec<String>,

    /// Sources whose images are never reused (comma separated)
    #[arg(long, env = "RSS_IMAGE_FORCE_DENY_SOURCES", value_delimiter = ',')]
    pub force_deny_sources: Vec<String>,

    /// Gemini API key; curation and image generation are off without it
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Model used for curated summaries
    #[arg(long, env = "GEMINI_CURATION_MODEL", default_value = DEFAULT_CURATION_MODEL)]
    pub curation_model: String,

    /// Model used for generated covers
    #[arg(long, env = "GEMINI_IMAGE_MODEL", default_value = DEFAULT_IMAGE_MODEL)]
    pub image_model: String,

    /// Rewrite summaries with the curation model
    #[arg(long, env = "NEWS_CURATION_ENABLED", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub curation_enabled: bool,

    /// Curated items per run (0 = unlimited)
    #[arg(long, env = "NEWS_CURATION_LIMIT", default_value_t = 20)]
    pub curation_limit: usize,

    /// Generated covers per run; 0 (the default) disables generation
    #[arg(long, env = "NEWS_AI_IMAGE_LIMIT", default_value_t = 0)]
    pub ai_image_limit: usize,

    /// Style clause used in fallback image prompts
    #[arg(long, env = "NEWS_IMAGE_STYLE", default_value = DEFAULT_IMAGE_STYLE)]
    pub image_style: String,
}

impl Cli {
    /// The API key, if one is set and not blank.
    pub fn gemini_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Cover pipeline settings with ranges clamped.
    pub fn cover_settings(&self) -> CoverSettings {
        let style = self.image_style.trim();
        CoverSettings {
            image_dir: self.image_dir.clone(),
            pool_dir: self.pool_dir.clone(),
            dedup_in_run: self.dedup_in_run,
            brand_priority: self.brand_priority,
            use_source_image: self.use_source_image,
            local_pool: self.local_pool,
            search_enabled: self.search_enabled,
            search_target: self.search_target.clamp(3, 20),
            search_timeout: Duration::from_secs(self.search_timeout.max(MIN_TIMEOUT_SECS)),
            variant_count: self.variant_count.clamp(1, 5),
            daily_rotation: self.daily_rotation,
            infer_company: self.infer_company,
            keyword_stock: self.keyword_stock,
            stock_timeout: Duration::from_secs(self.stock_timeout.max(MIN_TIMEOUT_SECS)),
            min_stock_bytes: self.min_stock_bytes,
            representative_queries: self.representative_queries,
            ai_image_limit: self.ai_image_limit,
            image_style: if style.is_empty() { DEFAULT_IMAGE_STYLE.to_string() } else { style.to_string() },
        }
    }

    pub fn rights_policy(&self) -> RightsPolicy {
        RightsPolicy::new(
            self.force_allow_sources.iter().cloned(),
            self.force_deny_sources.iter().cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["awful_news_covers"]);

        assert_eq!(cli.json_output, PathBuf::from("news_data.json"));
        assert_eq!(cli.js_output, PathBuf::from("news_data.js"));
        assert_eq!(cli.retention_days, 7);
        assert!(cli.dedup_in_run);
        assert!(!cli.keyword_stock);
        assert_eq!(cli.ai_image_limit, 0);
        assert_eq!(cli.curation_limit, 20);
        assert_eq!(cli.curation_model, "gemini-1.5-flash");
    }

    #[test]
    fn test_cli_short_flags_and_booleans() {
        let cli = Cli::parse_from([
            "awful_news_covers",
            "-j",
            "/tmp/out.json",
            "-c",
            "/tmp/extra.yaml",
            "--dedup-in-run",
            "false",
            "--daily-rotation",
            "off",
            "--infer-company",
            "yes",
        ]);

        assert_eq!(cli.json_output, PathBuf::from("/tmp/out.json"));
        assert_eq!(cli.catalog_extension, Some(PathBuf::from("/tmp/extra.yaml")));
        assert!(!cli.dedup_in_run);
        assert!(!cli.daily_rotation);
        assert!(cli.infer_company);
    }

    #[test]
    fn test_cover_settings_are_clamped() {
        let cli = Cli::parse_from([
            "awful_news_covers",
            "--search-target",
            "50",
            "--variant-count",
            "0",
            "--image-style",
            "   ",
            "--search-timeout",
            "3",
            "--stock-timeout",
            "0",
        ]);
        let settings = cli.cover_settings();

        assert_eq!(settings.search_target, 20);
        assert_eq!(settings.variant_count, 1);
        assert_eq!(settings.image_style, DEFAULT_IMAGE_STYLE);
        assert_eq!(settings.search_timeout, Duration::from_secs(5));
        assert_eq!(settings.candidate_timeout(), Duration::from_secs(5));
        assert_eq!(settings.stock_timeout, Duration::from_secs(5));

        let generous = Cli::parse_from(["awful_news_covers", "--stock-timeout", "30"]).cover_settings();
        assert_eq!(generous.stock_timeout, Duration::from_secs(30));
        assert_eq!(generous.search_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_rights_policy_lists() {
        let cli = Cli::parse_from([
            "awful_news_covers",
            "--force-allow-sources",
            "OpenAI Blog, TechCrunch",
            "--force-deny-sources",
            "Wired",
        ]);
        let policy = cli.rights_policy();

        assert!(policy.is_force_allowed("openai blog"));
        assert!(policy.is_force_allowed("TechCrunch"));
        assert!(policy.is_force_denied("WIRED"));
        assert!(!policy.is_force_allowed("Wired"));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let cli = Cli::parse_from(["awful_news_covers", "--gemini-api-key", "  "]);
        assert_eq!(cli.gemini_key(), None);
    }
}
