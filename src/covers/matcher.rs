//! Map free text to the best company or topical theme.
//!
//! Scoring is a tuple `(catalog_priority, offset, -alias_len)` where the
//! lowest wins: any company mention beats any topic, an earlier mention beats
//! a later one, and at the same offset the longer alias wins.

use super::catalog::{Catalog, Theme};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static WORDISH_ALIAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9 .+\-&]+$").unwrap());

static CAPITALIZED_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z0-9&.+\-]{2,24}\b").unwrap());

const INFER_STOPLIST: &[&str] = &[
    "The", "This", "That", "Why", "How", "What", "When", "Where", "Who", "Its", "Their", "US",
    "UK", "EU", "AI", "IT", "CEO", "CFO", "CTO", "RSS",
];

/// A matched theme and the alias that triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeMatch<'c> {
    pub theme: Cow<'c, Theme>,
    pub alias: String,
}

/// Deterministic matcher over a merged [`Catalog`].
#[derive(Debug, Clone)]
pub struct ThemeMatcher {
    catalog: Catalog,
    infer_company: bool,
}

type Score = (u8, usize, isize);

impl ThemeMatcher {
    pub fn new(catalog: Catalog, infer_company: bool) -> Self {
        Self { catalog, infer_company }
    }

    /// Best theme over both catalogs, company first.
    ///
    /// With inference on and no catalog hit, the first capitalized token of
    /// `text` outside the stoplist becomes an ephemeral company theme.
    pub fn match_text(&self, text: &str) -> Option<ThemeMatch<'_>> {
        let lower = text.to_lowercase();
        let mut best: Option<(Score, &Theme, &str)> = None;
        scan(&self.catalog.companies, 0, &lower, &mut best);
        scan(&self.catalog.topics, 1, &lower, &mut best);

        if let Some((_, theme, alias)) = best {
            return Some(ThemeMatch { theme: Cow::Borrowed(theme), alias: alias.to_string() });
        }
        self.infer(text)
    }

    /// Best company theme only.
    ///
    /// Topics are ignored, so a headline naming an uncatalogued company next
    /// to a topical keyword still reaches inference.
    pub fn match_company(&self, text: &str) -> Option<ThemeMatch<'_>> {
        let lower = text.to_lowercase();
        let mut best = None;
        scan(&self.catalog.companies, 0, &lower, &mut best);
        match best {
            Some((_, theme, alias)) => {
                Some(ThemeMatch { theme: Cow::Borrowed(theme), alias: alias.to_string() })
            }
            None => self.infer(text),
        }
    }

    fn infer(&self, text: &str) -> Option<ThemeMatch<'_>> {
        if !self.infer_company {
            return None;
        }
        infer_company_token(text).map(|token| ThemeMatch {
            theme: Cow::Owned(Theme::inferred(token)),
            alias: token.to_string(),
        })
    }

    /// Best topical theme only.
    pub fn match_topical(&self, text: &str) -> Option<ThemeMatch<'_>> {
        let lower = text.to_lowercase();
        let mut best = None;
        scan(&self.catalog.topics, 1, &lower, &mut best);
        best.map(|(_, theme, alias)| ThemeMatch {
            theme: Cow::Borrowed(theme),
            alias: alias.to_string(),
        })
    }
}

fn scan<'a>(
    themes: &'a [Theme],
    priority: u8,
    text_lower: &str,
    best: &mut Option<(Score, &'a Theme, &'a str)>,
) {
    for theme in themes {
        for alias in &theme.aliases {
            let Some(offset) = find_alias_position(text_lower, alias) else {
                continue;
            };
            let score = (priority, offset, -(alias.chars().count() as isize));
            if best.as_ref().is_none_or(|(s, _, _)| score < *s) {
                *best = Some((score, theme, alias.as_str()));
            }
        }
    }
}

/// Byte offset of the first occurrence of `alias` in `text_lower`.
///
/// ASCII-ish aliases only match on word boundaries so that "arm" is not
/// found inside "alarm".
pub fn find_alias_position(text_lower: &str, alias: &str) -> Option<usize> {
    let needle = alias.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    if !WORDISH_ALIAS.is_match(&needle) {
        return text_lower.find(&needle);
    }

    let is_word = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    text_lower.match_indices(&needle).map(|(i, _)| i).find(|&i| {
        let before = text_lower[..i].chars().next_back();
        let after = text_lower[i + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

/// First capitalized, company-looking token of `title` outside the stoplist.
pub fn infer_company_token(title: &str) -> Option<&str> {
    CAPITALIZED_TOKEN
        .find_iter(title)
        .map(|m| m.as_str())
        .find(|token| !INFER_STOPLIST.contains(token))
}
