//! Internationalization (i18n) module for localized error responses.
//!
//! This module contains everything needed to pick a caller's language and to
//! turn message keys into text in that language.
//!
//! # Architecture
//!
//! - `locale`: Normalized `Locale` type with the fixed English baseline
//! - `registry`: Ordered allow-list of supported locales, loaded at startup
//! - `accept_language`: `Accept-Language` parsing and best-match lookup
//! - `bundle`: `MessageResolver` trait and Fluent resource bundles
//!
//! # Example
//!
//! ```rust,ignore
//! use localized_problems::i18n::{accept_language, LocaleRegistry};
//!
//! let registry = LocaleRegistry::new(["en", "fr", "ru"])?;
//! let locale = accept_language::resolve(Some("fr-CA,fr;q=0.9"), &registry);
//! assert_eq!(locale.code(), "fr");
//! ```

pub mod accept_language;
mod bundle;
mod locale;
mod registry;

pub use bundle::{BundleError, MessageNotFound, MessageResolver, ResourceBundles};
pub use locale::Locale;
pub use registry::{default_locales, LocaleRegistry, RegistryError};
