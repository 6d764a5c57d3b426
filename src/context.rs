//! Per-request context carrying the resolved locale.
//!
//! The locale middleware attaches a [`RequestContext`] to the request's
//! extensions before the handler runs. Anything holding the request (or its
//! parts) afterwards can read it; nothing runs before the attachment, and each
//! request owns its own extensions, so contexts never leak across requests.

use crate::i18n::Locale;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Extensions;
use std::convert::Infallible;

/// Immutable request-scoped values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    locale: Locale,
}

impl RequestContext {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Context for code paths that run outside any request.
    pub fn detached() -> Self {
        Self::new(Locale::ENGLISH)
    }

    /// Read the context attached to a request, or a detached one.
    pub fn from_extensions(extensions: &Extensions) -> Self {
        extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(Self::detached)
    }

    /// Attach this context to a request's extensions.
    ///
    /// A context that is already present is left untouched; the first stage
    /// to resolve the locale wins.
    pub fn attach(self, extensions: &mut Extensions) {
        if extensions.get::<RequestContext>().is_none() {
            extensions.insert(self);
        }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::detached()
    }
}

/// Extracting a `RequestContext` never fails; routes without the locale
/// middleware see the detached context.
#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_extensions(&parts.extensions))
    }
}
