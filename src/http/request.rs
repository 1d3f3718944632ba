//! Request identification and request-shape helpers.
//!
//! # Responsibilities
//! - Generate a UUID request ID when the caller did not send one
//! - Echo it back in the `x-request-id` response header
//! - Open a tracing span carrying the request ID
//! - Turn extractor rejections and bad ids into `ApiError::Validation`

use axum::{
    body::Body,
    extract::rejection::JsonRejection,
    http::{HeaderName, Request},
    Json,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;
use uuid::Uuid;

use crate::error::ApiError;

pub const X_REQUEST_ID: &str = "x-request-id";

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Span for `TraceLayer`, tagged with the request ID.
pub fn make_request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    )
}

/// Unwrap a JSON body, mapping rejections to a validation error.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
    }
}

/// Parse a path segment that must be a UUID.
pub fn parse_id(raw: &str, param: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::Validation(format!("params/{param} must match format \"uuid\"")))
}

/// Enforce a length range, counted in characters.
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min {
        return Err(ApiError::Validation(format!(
            "body/{field} must NOT have fewer than {min} characters"
        )));
    }
    if len > max {
        return Err(ApiError::Validation(format!(
            "body/{field} must NOT have more than {max} characters"
        )));
    }
    Ok(())
}
