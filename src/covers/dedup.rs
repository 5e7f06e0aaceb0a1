//! Run-scoped de-duplication of chosen images.

use crate::utils::{sanitize_url, sha256_hex};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Cached files smaller than this are treated as broken downloads.
pub const MIN_CACHED_FILE_BYTES: u64 = 256;

/// Content hashes and remote URLs already used in the current run.
///
/// A claim succeeds at most once per key. With the registry disabled every
/// well-formed claim succeeds and nothing is recorded.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    enabled: bool,
    hashes: HashSet<String>,
    urls: HashSet<String>,
}

impl DedupRegistry {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, ..Default::default() }
    }

    /// Claim an image payload by its SHA-256. Empty payloads never claim.
    pub fn claim_bytes(&mut self, payload: &[u8]) -> bool {
        if payload.is_empty() {
            return false;
        }
        if !self.enabled {
            return true;
        }
        let digest = sha256_hex(payload);
        let fresh = self.hashes.insert(digest);
        if !fresh {
            debug!(bytes = payload.len(), "Duplicate image payload in run");
        }
        fresh
    }

    /// Whether `payload` was already claimed this run. Lets a caller check
    /// before storing and claim only once the store succeeded.
    pub fn is_claimed(&self, payload: &[u8]) -> bool {
        self.enabled && !payload.is_empty() && self.hashes.contains(&sha256_hex(payload))
    }

    /// Claim a remote `http(s)` URL by exact string.
    pub fn claim_url(&mut self, url: &str) -> bool {
        let Some(url) = sanitize_url(url) else {
            return false;
        };
        if !self.enabled {
            return true;
        }
        let fresh = self.urls.insert(url.to_string());
        if !fresh {
            debug!(%url, "Duplicate image URL in run");
        }
        fresh
    }

    /// Claim the bytes of a cached file. Missing, unreadable, or undersized
    /// files never claim.
    pub fn claim_file(&mut self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() && meta.len() >= MIN_CACHED_FILE_BYTES => {}
            _ => return false,
        }
        match std::fs::read(path) {
            Ok(bytes) => self.claim_bytes(&bytes),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len() + self.urls.len()
    }
}
