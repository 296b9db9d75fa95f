//! Router assembly for the file service

use std::any::Any;
use std::sync::Arc;

use axum::{http::StatusCode, middleware, response::Response, routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use super::error::error_response;
use super::handlers;
use super::middleware as http_middleware;
use crate::core::services::Services;

/// Build the file service router
pub fn build_router(services: Arc<Services>) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::descriptor_handler))
        .route("/health", get(handlers::health_handler))
        .route("/robots.txt", get(handlers::robots_handler))
        .route("/chunk", get(handlers::chunk_handler))
        .route("/lines", get(handlers::lines_handler))
        .route("/stat", get(handlers::stat_handler))
        .route("/search", get(handlers::search_handler))
        .fallback(handlers::not_found_handler);

    with_service_layers(routes).with_state(services)
}

/// Wrap `router` in the file service layer stack
///
/// Layers, outermost first: preflight status rewrite, permissive CORS,
/// request logging, panic catcher, read-only method guard.
pub fn with_service_layers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn(http_middleware::read_only))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(http_middleware::log_request))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(http_middleware::preflight_no_content))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Internal error: {detail}"),
    )
}
