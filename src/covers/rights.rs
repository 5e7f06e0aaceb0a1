//! Reuse policy for images published by the source itself.
//!
//! A source image may be shown verbatim only when the item or its feed
//! explicitly grants reuse, or when the operator has force-allowed the
//! source. This is a best-effort reading of license text, not a legal
//! determination.

use std::collections::HashSet;

const ALLOW_PHRASES: &[&str] = &[
    "creative commons",
    "creativecommons.org/licenses",
    "cc-by",
    "cc by",
    "cc-by-sa",
    "cc by-sa",
    "public domain",
    "reuse permitted",
    "redistribution permitted",
    "republish permitted",
];

const DENY_PHRASES: &[&str] = &[
    "all rights reserved",
    "do not reproduce",
    "no redistribution",
    "unauthorized reproduction prohibited",
];

/// True when `text` contains an allow phrase and no deny phrase.
pub fn has_explicit_allowance(text: &str) -> bool {
    let sample = text.trim().to_lowercase();
    if sample.is_empty() {
        return false;
    }
    let has_allow = ALLOW_PHRASES.iter().any(|p| sample.contains(p));
    let has_deny = DENY_PHRASES.iter().any(|p| sample.contains(p));
    has_allow && !has_deny
}

/// Feed-level verdict over the concatenated license, rights and docs text.
pub fn feed_allows(feed_rights_text: &str) -> bool {
    has_explicit_allowance(feed_rights_text)
}

/// Item-level verdict over the item's own rights text.
pub fn item_allows(item_rights_text: &str) -> bool {
    has_explicit_allowance(item_rights_text)
}

/// How a feed's images will be treated, for the per-feed log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyNote {
    ForceAllow,
    ForceDeny,
    ExplicitAllow,
    NoExplicitAllow,
}

impl PolicyNote {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyNote::ForceAllow => "force-allow",
            PolicyNote::ForceDeny => "force-deny",
            PolicyNote::ExplicitAllow => "explicit-allow",
            PolicyNote::NoExplicitAllow => "no-explicit-allow",
        }
    }
}

/// Operator overrides layered over the text heuristic.
#[derive(Debug, Clone, Default)]
pub struct RightsPolicy {
    force_allow: HashSet<String>,
    force_deny: HashSet<String>,
}

impl RightsPolicy {
    pub fn new<A, D>(force_allow: A, force_deny: D) -> Self
    where
        A: IntoIterator<Item = String>,
        D: IntoIterator<Item = String>,
    {
        Self {
            force_allow: normalize_names(force_allow),
            force_deny: normalize_names(force_deny),
        }
    }

    pub fn is_force_allowed(&self, source: &str) -> bool {
        self.force_allow.contains(&source_key(source))
    }

    pub fn is_force_denied(&self, source: &str) -> bool {
        self.force_deny.contains(&source_key(source))
    }

    /// Final gate for reusing `image_url` from `source`.
    ///
    /// Deny-list beats allow-list; an allow-listed source skips the text
    /// heuristic. Has no side effects: callers still have to claim the URL.
    pub fn should_use_source_image(
        &self,
        source: &str,
        image_url: Option<&str>,
        feed_allows: bool,
        item_rights: Option<&str>,
    ) -> bool {
        if image_url.is_none_or(|u| u.trim().is_empty()) {
            return false;
        }
        if self.is_force_denied(source) {
            return false;
        }
        if self.is_force_allowed(source) {
            return true;
        }
        if item_rights.is_some_and(item_allows) {
            return true;
        }
        feed_allows
    }

    pub fn note_for(&self, source: &str, feed_allows: bool) -> PolicyNote {
        if self.is_force_allowed(source) {
            PolicyNote::ForceAllow
        } else if self.is_force_denied(source) {
            PolicyNote::ForceDeny
        } else if feed_allows {
            PolicyNote::ExplicitAllow
        } else {
            PolicyNote::NoExplicitAllow
        }
    }
}

fn source_key(source: &str) -> String {
    source.trim().to_lowercase()
}

fn normalize_names<I: IntoIterator<Item = String>>(names: I) -> HashSet<String> {
    names
        .into_iter()
        .map(|n| source_key(&n))
        .filter(|n| !n.is_empty())
        .collect()
}
