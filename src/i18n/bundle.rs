//! Message resolution backed by per-locale Fluent bundles.
//!
//! Each locale's messages live in `<dir>/<locale>/<basename>.ftl`. The
//! baseline English bundle is mandatory; bundles for other supported locales
//! are optional.
//!
//! Positional arguments reach Fluent as the variables `$arg0`, `$arg1`, ...

use crate::i18n::{Locale, LocaleRegistry};
use async_trait::async_trait;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// No translation exists for a key in the requested locale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no message found under key '{key}' for locale '{locale}'")]
pub struct MessageNotFound {
    pub key: String,
    pub locale: Locale,
}

/// Errors raised while loading resource bundles.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read bundle {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid Fluent resource {origin}: {}", .errors.join("; "))]
    Invalid { origin: String, errors: Vec<String> },

    #[error("baseline bundle is missing: {0}")]
    MissingBaseline(PathBuf),
}

/// Maps a message key to localized text.
///
/// Implementations look only in the bundle of the given locale; falling back
/// to other locales is the caller's decision.
#[async_trait]
pub trait MessageResolver: Send + Sync {
    /// Resolve `key` for `locale`, interpolating `args` positionally.
    async fn resolve(
        &self,
        key: &str,
        args: &[String],
        locale: &Locale,
    ) -> Result<String, MessageNotFound>;
}

/// In-memory Fluent bundles, one per locale.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Default)]
pub struct ResourceBundles {
    bundles: HashMap<Locale, FluentBundle<FluentResource>>,
}

impl ResourceBundles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` as Fluent and add its messages to `locale`'s bundle.
    ///
    /// `origin` names the source in errors (usually a file path).
    pub fn add_source(
        &mut self,
        locale: &Locale,
        origin: &str,
        source: impl Into<String>,
    ) -> Result<(), BundleError> {
        let resource =
            FluentResource::try_new(source.into()).map_err(|(_, errors)| BundleError::Invalid {
                origin: origin.to_string(),
                errors: errors.iter().map(ToString::to_string).collect(),
            })?;

        let bundle = self.bundles.entry(locale.clone()).or_insert_with(|| {
            let mut bundle = FluentBundle::new_concurrent(vec![locale.language_identifier()]);
            // Unicode isolation marks would end up in the JSON text
            bundle.set_use_isolating(false);
            bundle
        });

        bundle
            .add_resource(resource)
            .map_err(|errors| BundleError::Invalid {
                origin: origin.to_string(),
                errors: errors.iter().map(ToString::to_string).collect(),
            })
    }

    /// Builder form of [`add_source`](Self::add_source) for inline sources.
    pub fn with_source(mut self, locale: Locale, source: &str) -> Result<Self, BundleError> {
        let origin = format!("<inline {}>", locale);
        self.add_source(&locale, &origin, source)?;
        Ok(self)
    }

    /// Load one bundle per supported locale from `dir`.
    ///
    /// # Returns
    /// * `Ok(ResourceBundles)` when at least the baseline bundle was read
    /// * `Err(BundleError)` if the baseline bundle is missing or any existing
    ///   bundle cannot be read or parsed
    pub fn load_dir(
        dir: impl AsRef<Path>,
        basename: &str,
        registry: &LocaleRegistry,
    ) -> Result<Self, BundleError> {
        let dir = dir.as_ref();
        let mut bundles = Self::new();

        for locale in registry.locales() {
            let path = dir.join(locale.code()).join(format!("{}.ftl", basename));
            if !path.is_file() {
                if locale.is_baseline() {
                    return Err(BundleError::MissingBaseline(path));
                }
                warn!(
                    locale = %locale,
                    path = %path.display(),
                    "No bundle for supported locale, messages will fall back to baseline"
                );
                continue;
            }

            let source = std::fs::read_to_string(&path).map_err(|source| BundleError::Io {
                path: path.clone(),
                source,
            })?;
            bundles.add_source(locale, &path.display().to_string(), source)?;
            debug!(locale = %locale, path = %path.display(), "Loaded message bundle");
        }

        let loaded: Vec<&str> = bundles.locales().map(Locale::code).collect();
        info!(locales = ?loaded, "Message bundles ready");
        Ok(bundles)
    }

    /// Check whether `locale`'s bundle defines `key`.
    pub fn contains(&self, locale: &Locale, key: &str) -> bool {
        self.bundles
            .get(locale)
            .is_some_and(|bundle| bundle.has_message(key))
    }

    /// Locales that have a bundle.
    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.bundles.keys()
    }
}

impl fmt::Debug for ResourceBundles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBundles")
            .field("locales", &self.locales().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl MessageResolver for ResourceBundles {
    async fn resolve(
        &self,
        key: &str,
        args: &[String],
        locale: &Locale,
    ) -> Result<String, MessageNotFound> {
        let not_found = || MessageNotFound {
            key: key.to_string(),
            locale: locale.clone(),
        };

        let bundle = self.bundles.get(locale).ok_or_else(not_found)?;
        let pattern = bundle
            .get_message(key)
            .and_then(|message| message.value())
            .ok_or_else(not_found)?;

        let mut fluent_args = FluentArgs::new();
        for (index, arg) in args.iter().enumerate() {
            fluent_args.set(format!("arg{}", index), arg.as_str());
        }

        let mut errors = Vec::new();
        let text = bundle.format_pattern(pattern, Some(&fluent_args), &mut errors);
        if !errors.is_empty() {
            debug!(key = key, locale = %locale, errors = ?errors, "Message formatted with errors");
        }
        Ok(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::validation::{Constraint, INVALID_PARAMETER_KEY, UNREADABLE_BODY_KEY};
    use std::fs;
    use tempfile::TempDir;

    fn french() -> Locale {
        Locale::from_tag("fr").unwrap()
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn write_bundle(root: &Path, code: &str, source: &str) {
        let dir = root.join(code);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("msgs.ftl"), source).unwrap();
    }

    // ==================== Formatting Tests ====================

    #[tokio::test]
    async fn test_resolve_positional_args() {
        let bundles = ResourceBundles::new()
            .with_source(
                Locale::ENGLISH,
                "not-found = The { $arg0 } { $arg1 } was not found; { $arg0 } lookup failed.",
            )
            .unwrap();
        let text = bundles
            .resolve("not-found", &args(&["order", "42"]), &Locale::ENGLISH)
            .await
            .unwrap();
        assert_eq!(text, "The order 42 was not found; order lookup failed.");
    }

    #[tokio::test]
    async fn test_resolve_has_no_isolation_marks() {
        let bundles = ResourceBundles::new()
            .with_source(french(), "greeting = Bonjour { $arg0 }")
            .unwrap();
        let text = bundles
            .resolve("greeting", &args(&["Alice"]), &french())
            .await
            .unwrap();
        assert_eq!(text, "Bonjour Alice");
    }

    #[tokio::test]
    async fn test_resolve_keeps_numeric_arguments_verbatim() {
        let bundles = ResourceBundles::new()
            .with_source(Locale::ENGLISH, "min = must be at least { $arg0 }")
            .unwrap();
        let text = bundles
            .resolve("min", &args(&["10000"]), &Locale::ENGLISH)
            .await
            .unwrap();
        assert_eq!(text, "must be at least 10000");
    }

    #[tokio::test]
    async fn test_resolve_missing_argument_still_formats() {
        let bundles = ResourceBundles::new()
            .with_source(Locale::ENGLISH, "pair = { $arg0 } and { $arg3 }")
            .unwrap();
        let text = bundles
            .resolve("pair", &args(&["a"]), &Locale::ENGLISH)
            .await
            .unwrap();
        assert!(text.starts_with("a and "));
        assert!(text.contains("arg3"));
    }

    #[tokio::test]
    async fn test_resolve_apostrophes_are_literal() {
        let bundles = ResourceBundles::new()
            .with_source(french(), "exists = L'{ $arg0 } existe déjà")
            .unwrap();
        let text = bundles.resolve("exists", &args(&["email"]), &french()).await.unwrap();
        assert_eq!(text, "L'email existe déjà");
    }

    // ==================== Resolver Tests ====================

    #[tokio::test]
    async fn test_resolve_does_not_fall_back() {
        let bundles = ResourceBundles::new()
            .with_source(Locale::ENGLISH, "greeting = Hello")
            .unwrap();
        let err = bundles
            .resolve("greeting", &[], &french())
            .await
            .expect_err("Should not fall back to English");
        assert_eq!(err.key, "greeting");
        assert_eq!(err.locale, french());
        assert_eq!(
            err.to_string(),
            "no message found under key 'greeting' for locale 'fr'"
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_key() {
        let bundles = ResourceBundles::new()
            .with_source(Locale::ENGLISH, "greeting = Hello")
            .unwrap();
        assert!(bundles.resolve("farewell", &[], &Locale::ENGLISH).await.is_err());
    }

    #[test]
    fn test_sources_extend_the_same_bundle() {
        let bundles = ResourceBundles::new()
            .with_source(Locale::ENGLISH, "a = 1")
            .and_then(|b| b.with_source(Locale::ENGLISH, "b = 2"))
            .unwrap();
        assert!(bundles.contains(&Locale::ENGLISH, "a"));
        assert!(bundles.contains(&Locale::ENGLISH, "b"));
        assert!(!bundles.contains(&french(), "a"));
        assert_eq!(bundles.locales().count(), 1);
    }

    #[test]
    fn test_syntax_error_is_rejected() {
        let result = ResourceBundles::new().with_source(Locale::ENGLISH, "ok = 1\n= orphan value");
        match result {
            Err(BundleError::Invalid { origin, errors }) => {
                assert_eq!(origin, "<inline en>");
                assert!(!errors.is_empty());
            }
            other => panic!("Expected invalid resource, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_message_is_rejected() {
        let result = ResourceBundles::new()
            .with_source(Locale::ENGLISH, "a = 1")
            .and_then(|b| b.with_source(Locale::ENGLISH, "a = 2"));
        assert!(matches!(result, Err(BundleError::Invalid { .. })));
    }

    // ==================== load_dir Tests ====================

    #[test]
    fn test_load_dir_reads_supported_bundles() {
        let temp_dir = TempDir::new().unwrap();
        write_bundle(temp_dir.path(), "en", "k = English");
        write_bundle(temp_dir.path(), "fr", "k = Français");
        write_bundle(temp_dir.path(), "de", "k = Deutsch");

        let registry = LocaleRegistry::new(["en", "fr", "ru"]).unwrap();
        let bundles = ResourceBundles::load_dir(temp_dir.path(), "msgs", &registry)
            .expect("Should load");

        assert!(bundles.contains(&Locale::ENGLISH, "k"));
        assert!(bundles.contains(&french(), "k"));
        // Unsupported bundles are never read, missing optional ones are skipped
        assert!(!bundles.contains(&Locale::from_tag("de").unwrap(), "k"));
        assert_eq!(bundles.locales().count(), 2);
    }

    #[test]
    fn test_load_dir_requires_baseline() {
        let temp_dir = TempDir::new().unwrap();
        write_bundle(temp_dir.path(), "fr", "k = Français");

        let registry = LocaleRegistry::new(["en", "fr"]).unwrap();
        let result = ResourceBundles::load_dir(temp_dir.path(), "msgs", &registry);
        assert!(matches!(result, Err(BundleError::MissingBaseline(_))));
    }

    #[test]
    fn test_load_dir_reports_file_in_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        write_bundle(temp_dir.path(), "en", "broken = { $arg0");

        let registry = LocaleRegistry::new(["en"]).unwrap();
        let err = ResourceBundles::load_dir(temp_dir.path(), "msgs", &registry)
            .expect_err("Should reject broken bundle");
        assert!(err.to_string().contains("msgs.ftl"));
    }

    #[test]
    fn test_shipped_bundles_define_every_key() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("messages");
        let registry = LocaleRegistry::default();
        let bundles = ResourceBundles::load_dir(dir, "error_messages", &registry)
            .expect("Shipped bundles should load");

        let keys = ErrorType::ALL
            .iter()
            .flat_map(|t| [t.message_key(), t.title_key()])
            .chain(Constraint::ALL.iter().map(|c| c.message_key()))
            .chain([UNREADABLE_BODY_KEY, INVALID_PARAMETER_KEY]);

        for key in keys {
            for locale in registry.locales() {
                assert!(
                    bundles.contains(locale, key),
                    "missing '{}' for {}",
                    key,
                    locale
                );
            }
        }
    }
}
