//! Locale type: normalized language identifier.
//!
//! A `Locale` only ever holds a primary language subtag ("en", "fr"), so two
//! locales compare equal exactly when they select the same message bundle.

use std::borrow::Cow;
use std::fmt;
use unic_langid::LanguageIdentifier;

/// A language used to select translated text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    /// Lowercase primary language subtag (e.g., "en", "fr")
    code: Cow<'static, str>,
}

impl Locale {
    /// The fixed default and baseline locale.
    ///
    /// Used whenever a caller's preference cannot be honored and as the second
    /// attempt when a message is missing from the requested bundle.
    pub const ENGLISH: Locale = Locale {
        code: Cow::Borrowed("en"),
    };

    /// Create a locale from a language tag, keeping only its primary subtag.
    ///
    /// Region and script subtags are dropped: `"fr-CA"` and `"fr_FR"` both
    /// become `"fr"`.
    ///
    /// # Returns
    /// * `Some(Locale)` if the tag is a well-formed language identifier
    /// * `None` otherwise (empty input, digits, wildcard, "und")
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let langid: LanguageIdentifier = tag.trim().parse().ok()?;
        if langid.language.is_empty() {
            return None;
        }

        let primary = langid.language.as_str();
        if primary == Locale::ENGLISH.code() {
            return Some(Locale::ENGLISH);
        }
        Some(Locale {
            code: Cow::Owned(primary.to_string()),
        })
    }

    /// Language identifier used to build this locale's message bundle.
    pub fn language_identifier(&self) -> LanguageIdentifier {
        self.code.parse().unwrap_or_default()
    }

    /// Get the primary language subtag.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Check if this is the baseline (English) locale.
    pub fn is_baseline(&self) -> bool {
        *self == Locale::ENGLISH
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::ENGLISH
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
