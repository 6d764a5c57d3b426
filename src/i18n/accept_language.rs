//! `Accept-Language` parsing and best-match locale lookup.
//!
//! Resolution never fails: a missing, blank, malformed or entirely unsupported
//! header yields [`Locale::ENGLISH`].

use crate::i18n::{Locale, LocaleRegistry};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::warn;

/// Errors raised while parsing a language-preference header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceptLanguageError {
    #[error("invalid language range: '{0}'")]
    InvalidRange(String),

    #[error("invalid quality value in '{0}'")]
    InvalidWeight(String),
}

/// A single weighted entry of a language-preference list.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRange {
    /// Lowercased language range (e.g., "fr-ca", "*")
    pub tag: String,

    /// Quality value in `[0, 1]`; 0 means "not acceptable"
    pub weight: f32,
}

static RANGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn range_regex() -> &'static Regex {
    RANGE_REGEX.get_or_init(|| {
        Regex::new(r"^(\*|[a-zA-Z]{1,8})(-([a-zA-Z0-9]{1,8}|\*))*$").expect("Invalid range regex")
    })
}

/// Parse a language-preference header into ranges ordered by priority.
///
/// Ranges are sorted by descending weight; ranges with equal weight keep the
/// order in which they were listed. Empty list elements are skipped.
pub fn parse(header: &str) -> Result<Vec<LanguageRange>, AcceptLanguageError> {
    let mut ranges = Vec::new();

    for element in header.split(',') {
        let element = element.trim();
        if element.is_empty() {
            continue;
        }

        let (tag, weight) = match element.split_once(';') {
            Some((tag, param)) => (tag.trim(), parse_weight(param, element)?),
            None => (element, 1.0),
        };

        if !range_regex().is_match(tag) {
            return Err(AcceptLanguageError::InvalidRange(element.to_string()));
        }

        ranges.push(LanguageRange {
            tag: tag.to_ascii_lowercase(),
            weight,
        });
    }

    // Stable sort keeps listing order for ties
    ranges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    Ok(ranges)
}

fn parse_weight(param: &str, element: &str) -> Result<f32, AcceptLanguageError> {
    let invalid = || AcceptLanguageError::InvalidWeight(element.to_string());

    let value = param
        .trim()
        .strip_prefix(['q', 'Q'])
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('='))
        .map(str::trim)
        .ok_or_else(invalid)?;

    let weight: f32 = value.parse().map_err(|_| invalid())?;
    if !(0.0..=1.0).contains(&weight) {
        return Err(invalid());
    }
    Ok(weight)
}

/// Find the best supported locale for the given ranges.
///
/// Each range is tried in priority order: first the full range, then with
/// trailing subtags removed one at a time (`fr-ca-x-foo` -> `fr-ca` -> `fr`).
/// The wildcard range and ranges weighted 0 never match.
pub fn lookup(ranges: &[LanguageRange], registry: &LocaleRegistry) -> Option<Locale> {
    for range in ranges {
        if range.weight <= 0.0 || range.tag == "*" {
            continue;
        }

        let mut candidate = range.tag.as_str();
        loop {
            if let Some(locale) = registry.get_by_code(candidate) {
                return Some(locale.clone());
            }
            match truncate(candidate) {
                Some(shorter) => candidate = shorter,
                None => break,
            }
        }
    }
    None
}

fn truncate(tag: &str) -> Option<&str> {
    let end = tag.rfind('-')?;
    let shorter = &tag[..end];

    // Drop a dangling singleton such as the "x" in "de-x-private"
    match shorter.rfind('-') {
        Some(idx) if shorter.len() - idx == 2 => Some(&shorter[..idx]),
        _ => Some(shorter),
    }
}

/// Resolve the caller's locale from a raw `Accept-Language` value.
///
/// Returns the highest-ranked supported locale, normalized to its primary
/// language subtag, or [`Locale::ENGLISH`] when the header is absent, blank,
/// malformed, or matches nothing in the registry.
pub fn resolve(raw_header: Option<&str>, registry: &LocaleRegistry) -> Locale {
    let Some(header) = raw_header.map(str::trim).filter(|value| !value.is_empty()) else {
        return Locale::ENGLISH;
    };

    match parse(header) {
        // Registry entries are already primary subtags
        Ok(ranges) => lookup(&ranges, registry).unwrap_or(Locale::ENGLISH),
        Err(e) => {
            warn!(
                header = header,
                error = %e,
                "Invalid Accept-Language header, falling back to default locale"
            );
            Locale::ENGLISH
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry() -> LocaleRegistry {
        LocaleRegistry::new(["en", "fr", "ru"]).expect("Should build registry")
    }

    fn code(header: Option<&str>) -> String {
        resolve(header, &registry()).code().to_string()
    }

    // ==================== parse Tests ====================

    #[test]
    fn test_parse_single_range() {
        let ranges = parse("fr").expect("Should parse");
        assert_eq!(
            ranges,
            vec![LanguageRange {
                tag: "fr".to_string(),
                weight: 1.0
            }]
        );
    }

    #[test]
    fn test_parse_sorts_by_weight() {
        let ranges = parse("ru;q=0.5, fr;q=0.9, en;q=0.1").expect("Should parse");
        let tags: Vec<&str> = ranges.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, vec!["fr", "ru", "en"]);
    }

    #[test]
    fn test_parse_keeps_listing_order_for_ties() {
        let ranges = parse("ru, fr, en;q=0.8, de;q=0.8").expect("Should parse");
        let tags: Vec<&str> = ranges.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, vec!["ru", "fr", "en", "de"]);
    }

    #[test]
    fn test_parse_lowercases_tags() {
        let ranges = parse("fr-CA").expect("Should parse");
        assert_eq!(ranges[0].tag, "fr-ca");
    }

    #[test]
    fn test_parse_accepts_spaced_weight() {
        let ranges = parse("fr ; q = 0.7").expect("Should parse");
        assert_eq!(ranges[0].weight, 0.7);
    }

    #[test]
    fn test_parse_skips_empty_elements() {
        let ranges = parse("en,,fr,").expect("Should parse");
        assert_eq!(ranges.len(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_range() {
        assert!(matches!(
            parse("en_US"),
            Err(AcceptLanguageError::InvalidRange(_))
        ));
        assert!(matches!(
            parse("toolongsubtag"),
            Err(AcceptLanguageError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_weight() {
        assert!(matches!(
            parse("fr;q=2"),
            Err(AcceptLanguageError::InvalidWeight(_))
        ));
        assert!(matches!(
            parse("fr;q=abc"),
            Err(AcceptLanguageError::InvalidWeight(_))
        ));
        assert!(matches!(
            parse("fr;level=1"),
            Err(AcceptLanguageError::InvalidWeight(_))
        ));
    }

    // ==================== lookup Tests ====================

    #[test]
    fn test_lookup_truncates_region() {
        let ranges = parse("fr-CA").unwrap();
        assert_eq!(lookup(&ranges, &registry()).unwrap().code(), "fr");
    }

    #[test]
    fn test_lookup_drops_private_use_singleton() {
        assert_eq!(truncate("ru-x-private"), Some("ru"));
        let ranges = parse("ru-x-private").unwrap();
        assert_eq!(lookup(&ranges, &registry()).unwrap().code(), "ru");
    }

    #[test]
    fn test_lookup_skips_wildcard_and_zero_weight() {
        let ranges = parse("*, fr;q=0").unwrap();
        assert!(lookup(&ranges, &registry()).is_none());
    }

    #[test]
    fn test_lookup_returns_none_when_unsupported() {
        let ranges = parse("de, it").unwrap();
        assert!(lookup(&ranges, &registry()).is_none());
    }

    // ==================== resolve Tests ====================

    #[test]
    fn test_resolve_simple() {
        assert_eq!(code(Some("fr")), "fr");
    }

    #[test]
    fn test_resolve_missing_or_blank_header() {
        assert_eq!(code(None), "en");
        assert_eq!(code(Some("")), "en");
        assert_eq!(code(Some("   ")), "en");
    }

    #[test]
    fn test_resolve_unsupported_falls_back() {
        assert_eq!(code(Some("xx-YY")), "en");
    }

    #[test]
    fn test_resolve_malformed_falls_back() {
        assert_eq!(code(Some("!!garbage!!")), "en");
        assert_eq!(code(Some("fr;q=banana")), "en");
    }

    #[test]
    fn test_resolve_picks_highest_ranked_supported() {
        // German is preferred but unsupported; Russian outranks French
        assert_eq!(code(Some("de;q=1.0, fr;q=0.4, ru;q=0.8")), "ru");
    }

    #[test]
    fn test_resolve_not_first_listed() {
        assert_eq!(code(Some("fr;q=0.2, ru")), "ru");
    }

    #[test]
    fn test_resolve_normalizes_to_primary_subtag() {
        assert_eq!(code(Some("ru-RU,ru;q=0.9,en-US;q=0.8")), "ru");
    }

    proptest! {
        #[test]
        fn prop_resolve_always_returns_supported_locale(header in ".*") {
            let registry = registry();
            let locale = resolve(Some(header.as_str()), &registry);
            prop_assert!(registry.is_supported(&locale));
        }

        #[test]
        fn prop_resolve_unsupported_tags_fall_back(tag in "[a-z]{3,8}") {
            // Three-letter and longer tags are never in the test registry
            let locale = resolve(Some(tag.as_str()), &registry());
            prop_assert_eq!(locale, Locale::ENGLISH);
        }
    }
}
