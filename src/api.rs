//! HTTP routes and shared application state.

use crate::context::RequestContext;
use crate::error::{ApiError, ErrorType, LocalizedError};
use crate::i18n::LocaleRegistry;
use crate::middleware::locale_middleware;
use crate::problem::FieldViolation;
use crate::translator::ProblemTranslator;
use crate::validation::{TestRequest, INVALID_PARAMETER_KEY, UNREADABLE_BODY_KEY};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Read-only state shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<LocaleRegistry>,
    pub translator: Arc<ProblemTranslator>,
}

impl AppState {
    pub fn new(registry: LocaleRegistry, translator: ProblemTranslator) -> Self {
        Self {
            registry: Arc::new(registry),
            translator: Arc::new(translator),
        }
    }
}

/// Build the application router with the locale middleware installed.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/test", post(test_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), locale_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestParams {
    throw_exception: bool,
}

/// Validate the body; when valid and `throwException=true`, raise the default
/// business error.
async fn test_endpoint(
    State(state): State<AppState>,
    context: RequestContext,
    params: Result<Query<TestParams>, QueryRejection>,
    body: Result<Json<TestRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let translator = &state.translator;
    let locale = context.locale();
    let mut violations = Vec::new();

    let throw_exception = match params {
        Ok(Query(params)) => params.throw_exception,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Rejected query parameters");
            let reason = translator.resolve_text(INVALID_PARAMETER_KEY, &[], locale).await;
            violations.push(FieldViolation::new("throwException", reason));
            false
        }
    };

    match body {
        Ok(Json(request)) => {
            let today = chrono::Local::now().date_naive();
            for rule in request.validate(today) {
                let reason = translator
                    .resolve_text(rule.constraint.message_key(), &rule.arguments, locale)
                    .await;
                violations.push(FieldViolation::new(rule.field, reason));
            }
        }
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Rejected request body");
            let reason = translator.resolve_text(UNREADABLE_BODY_KEY, &[], locale).await;
            violations.push(FieldViolation::new("body", reason));
        }
    }

    if !violations.is_empty() {
        info!(violations = violations.len(), locale = %locale, "Request validation failed");
        return Err(ApiError::Validation(violations));
    }

    if throw_exception {
        return Err(LocalizedError::new(ErrorType::DefaultBusinessError).into());
    }

    Ok(StatusCode::OK)
}
