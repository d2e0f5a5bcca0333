//! HTTP application assembly: router, middleware, and the optional SPA.

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use st_domain::config::CorsConfig;

use crate::api;
use crate::state::AppState;

/// Build the complete application router for `state`.
///
/// When `server.static_dir` points at a built front-end, every non-API
/// path falls through to it, with `index.html` serving client-side routes.
pub fn build_app(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors);
    let max_concurrent = server.max_concurrent_requests;
    tracing::info!(max_concurrent, "concurrency limit set");

    let mut router = api::router();

    match server.static_dir.as_deref() {
        Some(dir) if dir.exists() => {
            let spa = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
            tracing::info!(dir = %dir.display(), "serving static front-end");
            router = router.fallback_service(spa);
        }
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "static_dir not found, front-end not served");
        }
        None => {}
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent))
        .with_state(state)
}

/// Build a [`CorsLayer`] from the configured allowed origins.
///
/// An origin ending in `:*` matches any numeric port on that host.  A
/// lone `"*"` allows every origin without credentials.
pub fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    use axum::http::header;

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if cors.allowed_origins.len() == 1 && cors.allowed_origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard \"*\", all origins allowed");
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    }

    let mut exact: Vec<HeaderValue> = Vec::new();
    let mut wildcard_prefixes: Vec<String> = Vec::new();

    for origin in &cors.allowed_origins {
        if let Some(prefix) = origin.strip_suffix('*').filter(|p| p.ends_with(':')) {
            wildcard_prefixes.push(prefix.to_owned());
        } else if let Ok(hv) = origin.parse::<HeaderValue>() {
            exact.push(hv);
        } else {
            tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
        }
    }

    let allow_origin = if wildcard_prefixes.is_empty() {
        AllowOrigin::list(exact)
    } else {
        AllowOrigin::predicate(move |origin, _| {
            if exact.iter().any(|e| e.as_bytes() == origin.as_bytes()) {
                return true;
            }
            let origin_str = origin.to_str().unwrap_or("");
            wildcard_prefixes.iter().any(|prefix| {
                origin_str
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
            })
        })
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
