//! Localized RFC 9457 problem responses.
//!
//! Typed application errors are turned into problem documents whose title and
//! detail are rendered in the caller's preferred language.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod problem;
pub mod translator;
pub mod validation;
