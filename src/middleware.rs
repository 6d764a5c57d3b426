//! Locale middleware: resolves the caller's locale and localizes errors.
//!
//! Runs around every route. Before the handler it attaches a
//! [`RequestContext`] with the resolved locale; after the handler it takes a
//! raised [`ApiError`] out of the response (so it is rendered exactly once)
//! and replaces the response with the localized problem document.

use crate::api::AppState;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::i18n::accept_language;
use axum::extract::{Request, State};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

pub async fn locale_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let header = request.headers().get(ACCEPT_LANGUAGE).and_then(|value| match value.to_str() {
        Ok(text) => Some(text),
        Err(_) => {
            warn!("Accept-Language header is not valid ASCII, ignoring it");
            None
        }
    });
    let locale = accept_language::resolve(header, &state.registry);
    debug!(locale = %locale, "Resolved request locale");

    let context = RequestContext::new(locale);
    context.clone().attach(request.extensions_mut());

    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ApiError>() {
        Some(error) => state.translator.translate(&error, &context).await.into_response(),
        None => response,
    }
}
