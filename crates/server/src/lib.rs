//! Online Shop server library.
//!
//! JSON REST backend for the shop: accounts, catalog and orders. Built as a
//! library so the binary, the CLI and the integration tests share one router
//! and one database layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::REQUEST_ID_HEADER;
use crate::state::AppState;

/// Build the complete application router with its middleware stack.
#[must_use]
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());
    let cors = cors_layer(&state.config().cors_origins);

    let router = routes::routes()
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware));

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Credentialed CORS for the configured origins, `None` when there are none.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_disabled_without_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_some());
    }
}
