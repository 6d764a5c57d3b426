//! RFC 9457 problem documents.
//!
//! A [`ProblemDocument`] is the body sent back for every expected failure.
//! Fields that have no value are never serialized; in particular `errors` is
//! absent (not an empty array) when there are no field violations.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Content type for problem documents.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Base of the `type` URI; the numeric status is appended as the last segment.
pub const DEFAULT_TYPE_BASE_URI: &str = "https://developer.mozilla.org/en-US/docs/Web/HTTP/Status";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// A single structural-validation failure tied to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Which input field failed (e.g., "fieldEmail")
    pub pointer: String,

    /// Human-readable, already localized explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FieldViolation {
    /// A violation of `pointer`; without a reason the key is left out.
    pub fn new(pointer: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            pointer: pointer.into(),
            reason,
        }
    }
}

/// Standardized error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDocument {
    #[serde(serialize_with = "serialize_status", deserialize_with = "deserialize_status")]
    pub status: StatusCode,

    pub title: String,

    pub detail: String,

    /// `<base-uri>/<status>`
    #[serde(rename = "type")]
    pub type_url: String,

    /// Assembly time, `yyyy-MM-ddTHH:mm:ss` local time
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
}

/// Build the `type` URI for a status.
pub fn type_uri(base: &str, status: StatusCode) -> String {
    format!("{}/{}", base.trim_end_matches('/'), status.as_u16())
}

/// Assembles a [`ProblemDocument`], stamping `type` and `timestamp`.
#[derive(Debug, Clone)]
#[must_use]
pub struct ProblemBuilder {
    status: StatusCode,
    detail: String,
    title: Option<String>,
    errors: Vec<FieldViolation>,
    type_base_uri: String,
}

impl ProblemBuilder {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            title: None,
            errors: Vec::new(),
            type_base_uri: DEFAULT_TYPE_BASE_URI.to_string(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn errors(mut self, errors: Vec<FieldViolation>) -> Self {
        self.errors = errors;
        self
    }

    pub fn type_base_uri(mut self, base: impl Into<String>) -> Self {
        self.type_base_uri = base.into();
        self
    }

    /// Finish the document.
    ///
    /// Without an explicit title the status' canonical reason phrase is used.
    /// `errors` is only set when at least one violation was given.
    pub fn build(self) -> ProblemDocument {
        let title = self.title.unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string()
        });

        ProblemDocument {
            status: self.status,
            title,
            detail: self.detail,
            type_url: type_uri(&self.type_base_uri, self.status),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            errors: (!self.errors.is_empty()).then_some(self.errors),
        }
    }
}

impl IntoResponse for ProblemDocument {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut response = Json(self).into_response();
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        response
    }
}
