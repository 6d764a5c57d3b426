//! Locale registry: the allow-list of locales the service answers in.
//!
//! The registry is built once from configuration at startup and is shared
//! read-only by every request afterwards.

use crate::i18n::Locale;
use thiserror::Error;

/// Errors raised while building a [`LocaleRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid locale tag: '{0}'")]
    InvalidTag(String),

    #[error("supported locales must include the baseline locale '{}'", Locale::ENGLISH)]
    MissingBaseline,
}

/// Ordered allow-list of supported locales.
///
/// Entries are normalized to their primary language subtag and deduplicated,
/// keeping the position of the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
}

impl LocaleRegistry {
    /// Build a registry from configured locale tags.
    ///
    /// # Returns
    /// * `Ok(LocaleRegistry)` if every tag is valid and English is present
    /// * `Err(RegistryError)` otherwise
    pub fn new<I, S>(tags: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut locales: Vec<Locale> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref();
            let locale = Locale::from_tag(tag).ok_or_else(|| RegistryError::InvalidTag(tag.to_string()))?;
            if !locales.contains(&locale) {
                locales.push(locale);
            }
        }

        if !locales.iter().any(Locale::is_baseline) {
            return Err(RegistryError::MissingBaseline);
        }

        Ok(Self { locales })
    }

    /// Get a supported locale by its (lowercase) code.
    pub fn get_by_code(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|locale| locale.code() == code)
    }

    /// Check if a locale is in the allow-list.
    pub fn is_supported(&self, locale: &Locale) -> bool {
        self.locales.contains(locale)
    }

    /// All supported locales, in configured order.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self {
            locales: default_locales()
                .iter()
                .filter_map(|tag| Locale::from_tag(tag))
                .collect(),
        }
    }
}

/// Locales shipped with bundles under `messages/`.
pub fn default_locales() -> &'static [&'static str] {
    &["en", "fr", "ru", "ar"]
}
