//! Error bodies for responses produced outside the handlers.
//!
//! # Responsibilities
//! - Fallbacks for unknown routes and unsupported methods
//! - Rewrite bare 408/413 responses from tower-http layers into `ErrorBody`
//!
//! # Design Decisions
//! - Responses already carrying a JSON body pass through untouched

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::Response,
};

use crate::error::ErrorBody;

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    ErrorBody::response(StatusCode::NOT_FOUND, "Route not found")
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed() -> Response {
    ErrorBody::response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"))
}

/// Gives timeout and body-limit rejections the standard error body.
pub async fn error_body_for_layer_rejections(res: Response) -> Response {
    let message = match res.status() {
        StatusCode::REQUEST_TIMEOUT => "Request timed out",
        StatusCode::PAYLOAD_TOO_LARGE => "Request body too large",
        _ => return res,
    };
    if is_json(&res) {
        return res;
    }

    let (parts, _) = res.into_parts();
    let mut rewritten = ErrorBody::response(parts.status, message);
    // Keep headers set further in, such as x-request-id.
    for (name, value) in parts.headers.iter() {
        if name != CONTENT_TYPE && name != axum::http::header::CONTENT_LENGTH {
            rewritten.headers_mut().append(name.clone(), value.clone());
        }
    }
    rewritten
}
