//! HTTP error mapping
//!
//! Converts core errors into status codes and the JSON error
//! envelope `{"error": {"message": "..."}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::core::error::KmgrError;

impl KmgrError {
    /// Convert error to appropriate HTTP status code
    pub fn status_code(&self) -> StatusCode {
        if self.is_access_denied() {
            StatusCode::FORBIDDEN
        } else if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else if matches!(self, KmgrError::MethodNotAllowed(_)) {
            StatusCode::METHOD_NOT_ALLOWED
        } else if self.is_bad_request() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// JSON error envelope with the given status
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(json!({
        "error": { "message": message.into() },
    }));
    (status, body).into_response()
}

/// Implement IntoResponse for automatic error conversion in Axum
impl IntoResponse for KmgrError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.message())
    }
}
