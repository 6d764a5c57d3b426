//! Typed, localizable errors raised by request handlers.
//!
//! Errors carry message keys and arguments only. Text is resolved later by
//! the [`ProblemTranslator`](crate::translator::ProblemTranslator), once the
//! request's locale is known.

use crate::problem::FieldViolation;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use thiserror::Error;

/// Classification of business errors.
///
/// Each entry pins a message key, a title key and a default status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    DefaultBusinessError,
    ResourceNotFound,
    ResourceConflict,
    InternalError,
}

impl ErrorType {
    pub const ALL: [ErrorType; 4] = [
        ErrorType::DefaultBusinessError,
        ErrorType::ResourceNotFound,
        ErrorType::ResourceConflict,
        ErrorType::InternalError,
    ];

    pub fn message_key(self) -> &'static str {
        match self {
            ErrorType::DefaultBusinessError => "business-exception-default-message",
            ErrorType::ResourceNotFound => "business-exception-not-found-message",
            ErrorType::ResourceConflict => "business-exception-conflict-message",
            ErrorType::InternalError => "internal-exception-default-message",
        }
    }

    pub fn title_key(self) -> &'static str {
        match self {
            ErrorType::DefaultBusinessError => "business-exception-default-title",
            ErrorType::ResourceNotFound => "business-exception-not-found-title",
            ErrorType::ResourceConflict => "business-exception-conflict-title",
            ErrorType::InternalError => "internal-exception-default-title",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorType::DefaultBusinessError => StatusCode::PRECONDITION_REQUIRED,
            ErrorType::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorType::ResourceConflict => StatusCode::CONFLICT,
            ErrorType::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A business error whose text is resolved at response time.
///
/// Built once at the raise site and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("localized error '{message_key}' ({status})")]
#[must_use]
pub struct LocalizedError {
    message_key: &'static str,
    title_key: &'static str,
    status: StatusCode,
    arguments: Vec<String>,
}

impl LocalizedError {
    pub fn new(error_type: ErrorType) -> Self {
        Self {
            message_key: error_type.message_key(),
            title_key: error_type.title_key(),
            status: error_type.status(),
            arguments: Vec::new(),
        }
    }

    /// Append one positional message argument.
    pub fn with_arg(mut self, arg: impl ToString) -> Self {
        self.arguments.push(arg.to_string());
        self
    }

    /// Append several positional message arguments.
    pub fn with_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.arguments.extend(args.into_iter().map(|a| a.to_string()));
        self
    }

    /// Override the classification's default status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn message_key(&self) -> &'static str {
        self.message_key
    }

    pub fn title_key(&self) -> &'static str {
        self.title_key
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

impl From<ErrorType> for LocalizedError {
    fn from(error_type: ErrorType) -> Self {
        LocalizedError::new(error_type)
    }
}

/// Error returned by request handlers.
///
/// Handlers never render text themselves: converting an `ApiError` into a
/// response only records the error in the response extensions, and the
/// locale middleware turns it into a localized problem document. Without
/// that middleware the caller receives a bare status code.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error(transparent)]
    Localized(#[from] LocalizedError),

    #[error("request validation failed with {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("internal error: {0}")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Localized(error) => error.status(),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => ErrorType::InternalError.status(),
        }
    }
}

impl From<ErrorType> for ApiError {
    fn from(error_type: ErrorType) -> Self {
        ApiError::Localized(error_type.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(Arc::new(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(self);
        response
    }
}
