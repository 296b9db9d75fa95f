//! Middleware for the file service
//!
//! Request logging with duration tracking, the read-only method guard
//! and the preflight status rewrite.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::core::error::KmgrError;

/// Request logging middleware
///
/// Logs all incoming requests with method, URI, status code, and
/// duration. Client errors are logged at WARN, server errors at
/// ERROR, everything else at INFO.
pub async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    // Process request
    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration_ms,
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration_ms,
            "Request rejected"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration_ms,
            "Request completed"
        );
    }

    response
}

/// Allow only GET (and HEAD); answer OPTIONS with 204
pub async fn read_only(request: Request<Body>, next: Next) -> Response {
    match *request.method() {
        Method::GET | Method::HEAD => next.run(request).await,
        Method::OPTIONS => StatusCode::NO_CONTENT.into_response(),
        ref other => KmgrError::MethodNotAllowed(other.to_string()).into_response(),
    }
}

/// Answer OPTIONS with 204 No Content
///
/// The CORS layer answers every OPTIONS request itself with 200; this
/// sits outside it and keeps the CORS headers while fixing the status.
pub async fn preflight_no_content(request: Request<Body>, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
