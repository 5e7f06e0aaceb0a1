//! Cover image resolution.
//!
//! Given a collected [`NewsItem`](crate::models::NewsItem), pick exactly one
//! cover image under copyright-safety and visual-variety constraints:
//!
//! 1. the source's own image, when its rights allow reuse
//! 2. a brand variant from the company's image pool
//! 3. the company logo itself
//! 4. an optional generated or stock photo
//! 5. a locally rendered SVG illustration, which always succeeds
//!
//! All state that lives for a single collection run is kept in an explicit
//! [`RunContext`].

pub mod catalog;
pub mod dedup;
pub mod matcher;
pub mod pool;
pub mod render;
pub mod resolver;
pub mod rights;
pub mod stock;

use chrono::{Local, NaiveDate};
use dedup::DedupRegistry;
use pool::VariantPool;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_IMAGE_STYLE: &str = "high-quality 3D render, futuristic IT newsroom illustration, \
     isometric composition, cinematic lighting, clean background, \
     no brand logos, no text overlay";

/// Tunables for the cover pipeline, after clamping.
#[derive(Debug, Clone)]
pub struct CoverSettings {
    /// Generated assets (SVG covers, downloaded stock and AI images).
    pub image_dir: PathBuf,
    /// Root of the per-company image pools.
    pub pool_dir: PathBuf,
    pub dedup_in_run: bool,
    pub brand_priority: bool,
    pub use_source_image: bool,
    pub local_pool: bool,
    pub search_enabled: bool,
    /// Desired pool size, `3..=20`.
    pub search_target: usize,
    pub search_timeout: Duration,
    /// Generated brand variants, `1..=5`.
    pub variant_count: usize,
    pub daily_rotation: bool,
    pub infer_company: bool,
    pub keyword_stock: bool,
    pub stock_timeout: Duration,
    pub min_stock_bytes: usize,
    pub representative_queries: bool,
    /// Generated images allowed per run; `0` disables the tier.
    pub ai_image_limit: usize,
    pub image_style: String,
}

impl Default for CoverSettings {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("generated_images"),
            pool_dir: PathBuf::from("company_images"),
            dedup_in_run: true,
            brand_priority: true,
            use_source_image: true,
            local_pool: true,
            search_enabled: true,
            search_target: 10,
            search_timeout: Duration::from_secs(12),
            variant_count: 5,
            daily_rotation: true,
            infer_company: false,
            keyword_stock: false,
            stock_timeout: Duration::from_secs(20),
            min_stock_bytes: 1500,
            representative_queries: true,
            ai_image_limit: 0,
            image_style: DEFAULT_IMAGE_STYLE.to_string(),
        }
    }
}

impl CoverSettings {
    /// Timeout for single pool candidate downloads and Commons searches.
    pub fn candidate_timeout(&self) -> Duration {
        self.search_timeout
            .clamp(Duration::from_secs(4), Duration::from_secs(8))
    }
}

/// State scoped to one collection run.
#[derive(Debug)]
pub struct RunContext {
    pub dedup: DedupRegistry,
    /// Pool per theme id; `None` records that no pool could be built.
    pub(crate) pools: HashMap<String, Option<VariantPool>>,
    pub(crate) last_pick: HashMap<String, usize>,
    pub(crate) logo_cache: HashMap<String, Option<String>>,
    pub(crate) ai_images: usize,
    today: NaiveDate,
}

impl RunContext {
    pub fn new(dedup_enabled: bool) -> Self {
        Self::for_date(dedup_enabled, Local::now().date_naive())
    }

    pub fn for_date(dedup_enabled: bool, today: NaiveDate) -> Self {
        Self {
            dedup: DedupRegistry::new(dedup_enabled),
            pools: HashMap::new(),
            last_pick: HashMap::new(),
            logo_cache: HashMap::new(),
            ai_images: 0,
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn ai_images(&self) -> usize {
        self.ai_images
    }
}
