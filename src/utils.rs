//! Utility functions for text cleanup, hashing, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace normalization and URL sanitizing for scraped fields
//! - ASCII slugs for OS-safe file names
//! - SHA-256 digests and hex windows used for deterministic seeding
//! - File system validation for output directories

use scraper::Html;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an HTML fragment, whitespace-collapsed.
pub fn html_to_text(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return normalize_space(html);
    }
    let fragment = Html::parse_fragment(html);
    normalize_space(&fragment.root_element().text().collect::<Vec<_>>().join(" "))
}

/// Decode HTML entities in plain text, leaving anything tag-like as is.
pub fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let fragment = Html::parse_fragment(&text.replace('<', "&lt;"));
    fragment.root_element().text().collect()
}

/// Return the trimmed URL when it is an absolute `http(s)` URL.
///
/// Scraped `src`/`href` attributes are frequently relative, protocol-relative
/// or `data:` URIs; none of those are usable as a remote image reference.
pub fn sanitize_url(url: &str) -> Option<&str> {
    let value = url.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Some(value)
    } else {
        None
    }
}

/// Convert arbitrary text into a lowercase ASCII slug of at most `max_len` bytes.
///
/// Non-alphanumeric runs become a single hyphen. Titles with no ASCII content
/// (e.g. Korean headlines) fall back to `"news"`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Hello, World!", 40), "hello-world");
/// assert_eq!(slugify("삼성전자", 40), "news");
/// ```
pub fn slugify(value: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(max_len);
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "news".to_string()
    } else {
        slug.to_string()
    }
}

/// Render a path with forward slashes so it can be embedded in JSON for the web viewer.
pub fn to_web_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Interpret `digest[start..end]` as a hexadecimal number.
///
/// Used to derive stable seeds (lock numbers, rotation offsets) from a digest.
/// Out-of-range windows or non-hex input yield `0`.
pub fn hex_window(digest: &str, start: usize, end: usize) -> u64 {
    digest
        .get(start..end)
        .and_then(|s| u64::from_str_radix(s, 16).ok())
        .unwrap_or(0)
}

/// Keep at most `max` characters of `s` (char-based, never splits a code point).
pub fn take_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let scratch_path = path.join("..__write_check__");
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
