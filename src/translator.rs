//! Problem translator: turns raised errors into localized problem documents.
//!
//! Text is resolved through an ordered list of attempts: the requested
//! locale, then the English baseline, then a fixed literal. A missing
//! translation is logged and recovered, never returned as an error.

use crate::context::RequestContext;
use crate::error::{ApiError, ErrorType, LocalizedError};
use crate::i18n::{Locale, MessageNotFound, MessageResolver};
use crate::problem::{FieldViolation, ProblemBuilder, ProblemDocument, DEFAULT_TYPE_BASE_URI};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Detail used when no bundle has the message.
pub const FALLBACK_DETAIL: &str = "An unexpected error occurred.";

/// Title used when no bundle has the message.
pub const FALLBACK_TITLE: &str = "Error";

pub const VALIDATION_TITLE: &str = "Validation Error";
pub const VALIDATION_DETAIL: &str = "Validation failed.";

/// Resolved title/detail pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    pub title: String,
    pub detail: String,
}

impl LocalizedText {
    fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            detail: FALLBACK_DETAIL.to_string(),
        }
    }
}

/// Builds problem documents from raised errors.
///
/// Holds only read-only collaborators and is shared by all requests.
pub struct ProblemTranslator {
    resolver: Arc<dyn MessageResolver>,
    type_base_uri: String,
}

impl ProblemTranslator {
    pub fn new(resolver: Arc<dyn MessageResolver>) -> Self {
        Self {
            resolver,
            type_base_uri: DEFAULT_TYPE_BASE_URI.to_string(),
        }
    }

    pub fn with_type_base_uri(mut self, base: impl Into<String>) -> Self {
        self.type_base_uri = base.into();
        self
    }

    /// Translate any handler error using the request's context.
    pub async fn translate(&self, error: &ApiError, context: &RequestContext) -> ProblemDocument {
        match error {
            ApiError::Localized(localized) => self.translate_localized(localized, context.locale()).await,
            ApiError::Validation(violations) => self.translate_violations(violations.clone()),
            ApiError::Internal(cause) => {
                error!(error = ?cause, "Unhandled error while processing request");
                let internal = LocalizedError::new(ErrorType::InternalError);
                self.translate_localized(&internal, context.locale()).await
            }
        }
    }

    /// Typed error path: localize title and detail, then assemble.
    pub async fn translate_localized(&self, error: &LocalizedError, locale: &Locale) -> ProblemDocument {
        let text = self.localize(error, locale).await;
        ProblemBuilder::new(error.status(), text.detail)
            .title(text.title)
            .type_base_uri(&self.type_base_uri)
            .build()
    }

    /// Structural validation path: fixed 400 document listing the violations
    /// in the order they were reported.
    pub fn translate_violations(&self, violations: Vec<FieldViolation>) -> ProblemDocument {
        info!(violations = violations.len(), "Handling request validation failure");
        ProblemBuilder::new(StatusCode::BAD_REQUEST, VALIDATION_DETAIL)
            .title(VALIDATION_TITLE)
            .errors(violations)
            .type_base_uri(&self.type_base_uri)
            .build()
    }

    /// Resolve the title/detail pair of `error` for `locale`.
    ///
    /// Title and detail fall back together: if either key is missing for a
    /// locale, both are taken from the next attempt.
    pub async fn localize(&self, error: &LocalizedError, locale: &Locale) -> LocalizedText {
        for candidate in fallback_chain(locale) {
            match self.resolve_pair(error, &candidate).await {
                Ok(text) => return text,
                Err(missing) => warn!(
                    key = %missing.key,
                    locale = %missing.locale,
                    message_key = error.message_key(),
                    "Localized message not found, trying next fallback"
                ),
            }
        }

        warn!(
            message_key = error.message_key(),
            "No bundle has the message, returning default text"
        );
        LocalizedText::fallback()
    }

    /// Resolve a single key with the same requested-then-baseline chain.
    ///
    /// Returns `None` when no bundle has the key.
    pub async fn resolve_text(&self, key: &str, args: &[String], locale: &Locale) -> Option<String> {
        for candidate in fallback_chain(locale) {
            match self.resolver.resolve(key, args, &candidate).await {
                Ok(text) => return Some(text),
                Err(missing) => warn!(
                    key = %missing.key,
                    locale = %missing.locale,
                    "Localized message not found, trying next fallback"
                ),
            }
        }
        None
    }

    async fn resolve_pair(&self, error: &LocalizedError, locale: &Locale) -> Result<LocalizedText, MessageNotFound> {
        let args = error.arguments();
        let detail = self.resolver.resolve(error.message_key(), args, locale).await?;
        let title = self.resolver.resolve(error.title_key(), args, locale).await?;
        Ok(LocalizedText { title, detail })
    }
}

/// Locales to try, in order.
fn fallback_chain(requested: &Locale) -> Vec<Locale> {
    let mut chain = vec![requested.clone()];
    if !requested.is_baseline() {
        chain.push(Locale::ENGLISH);
    }
    chain
}
