//! Persisted news data.
//!
//! Each run merges its fresh records into the JSON file written by earlier
//! runs and rewrites it, plus a JavaScript copy the static viewer can load
//! from `file://` without a fetch:
//!
//! ```text
//! news_data.json   # [ { "국가": "국내", ..., "country": "domestic", ... }, ... ]
//! news_data.js     # window.NEWS_DATA = [ ... ];
//! ```
//!
//! # Merge rules
//!
//! - Previous records older than the retention window are dropped; records
//!   whose timestamp does not parse are kept, records without one are not
//! - Fresh records come first, so they win when the same link (or title, for
//!   records without a link) appears twice
//! - Records mentioning OpenAI in the title or media name are listed first,
//!   everything else newest first

use crate::models::NewsRecord;
use chrono::{Duration, NaiveDateTime};
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Format of `collected_at` / `수집일시`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Load the records of a previous run.
///
/// A missing file is an empty history. A file that cannot be read or parsed
/// is logged and treated the same way, so a damaged output never blocks a run.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_existing(path: &Path) -> Vec<NewsRecord> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Could not read previous output");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<NewsRecord>>(&raw) {
        Ok(records) => {
            info!(count = records.len(), "Loaded previous records");
            records
        }
        Err(e) => {
            warn!(error = %e, "Previous output is not a record list; starting fresh");
            Vec::new()
        }
    }
}

/// Keep records collected within `days` of `now`.
pub fn retain_recent(records: Vec<NewsRecord>, now: NaiveDateTime, days: i64) -> Vec<NewsRecord> {
    let cutoff = now - Duration::days(days);
    records
        .into_iter()
        .filter(|record| {
            let stamp = record.collected_at_any();
            if stamp.is_empty() {
                return false;
            }
            match NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) {
                Ok(collected) => collected >= cutoff,
                Err(_) => true,
            }
        })
        .collect()
}

fn dedupe_key(record: &NewsRecord) -> String {
    let link = record.link_any();
    if link.is_empty() {
        record.title_any().to_string()
    } else {
        link.to_string()
    }
}

fn mentions_openai(record: &NewsRecord) -> bool {
    record.title_any().to_lowercase().contains("openai")
        || record.media_any().to_lowercase().contains("openai")
}

/// Merge fresh records ahead of retained ones, drop duplicates and order the
/// result for display.
pub fn merge(fresh: Vec<NewsRecord>, retained: Vec<NewsRecord>) -> Vec<NewsRecord> {
    let mut merged: Vec<NewsRecord> = fresh
        .into_iter()
        .chain(retained)
        .unique_by(dedupe_key)
        .collect();

    // Both sorts are stable: newest first, then OpenAI items lifted to the top.
    merged.sort_by(|a, b| b.collected_at_any().cmp(a.collected_at_any()));
    merged.sort_by_key(|record| !mentions_openai(record));
    merged
}

/// The JavaScript form of the data: `window.NEWS_DATA = <json>;`.
pub fn render_js(json: &str) -> String {
    format!("window.NEWS_DATA = {json};")
}

/// Write `records` as pretty JSON to `json_path` and as a script to `js_path`.
///
/// # Arguments
///
/// * `records` - The merged records, already ordered
/// * `json_path` - Target of the JSON file
/// * `js_path` - Target of the `window.NEWS_DATA` script
///
/// # Returns
///
/// `Ok(())` once both files are written, or the first serialization or I/O
/// error.
#[instrument(level = "info", skip_all, fields(json = %json_path.display(), js = %js_path.display()))]
pub async fn write_outputs(
    records: &[NewsRecord],
    json_path: &Path,
    js_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    fs::write(json_path, &json).await?;
    info!(count = records.len(), "Wrote JSON data file");

    fs::write(js_path, render_js(&json)).await?;
    info!("Wrote JS data file for local browser access");

    Ok(())
}
