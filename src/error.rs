//! API error taxonomy and its HTTP mapping.
//!
//! Every failure leaves the service as a JSON body of the shape
//! `{ "statusCode": u16, "error": "<reason phrase>", "message": "..." }`.
//!
//! # Design Decisions
//! - Storage failures are surfaced as a fixed, per-operation client error;
//!   the underlying error is logged and never returned to the caller
//! - `NotFound` doubles as the answer for resources the caller may not see

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::access::AccessError;
use crate::store::StoreError;

/// Kinds of ownership-scoped resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    TodoList,
    Todo,
    Comment,
    AccessGrant,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::TodoList => "Todo list",
            Resource::Todo => "Todo",
            Resource::Comment => "Comment",
            Resource::AccessGrant => "Access grant",
        };
        f.write_str(name)
    }
}

/// Errors returned by request handlers and the privilege gate.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Identity or privilege metadata is absent or malformed.
    #[error("invalid auth data")]
    InvalidAuthData,

    /// The route's capability is missing from the caller's privilege set.
    #[error("invalid privilege")]
    InsufficientPrivilege { required: &'static str },

    /// Resource absent, or invisible to the caller.
    #[error("{0} not found")]
    NotFound(Resource),

    /// Resource visible but the action is not allowed for the caller.
    #[error("Not allowed to modify this {}", .0.to_string().to_lowercase())]
    Forbidden(Resource),

    /// Malformed body or path parameters.
    #[error("{0}")]
    Validation(String),

    /// Storage layer failure, reported with a fixed message.
    #[error("{message}")]
    Persistence { message: &'static str },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAuthData => StatusCode::BAD_REQUEST,
            ApiError::InsufficientPrivilege { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    /// A JSON error response with the status's reason phrase as `error`.
    pub fn response(status: StatusCode, message: impl Into<String>) -> Response {
        let body = ErrorBody {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.into(),
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ErrorBody::response(self.status(), self.to_string())
    }
}

/// Attaches the client-facing failure message to lower-layer results.
pub trait OrFailure<T> {
    fn or_failure(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> OrFailure<T> for Result<T, StoreError> {
    fn or_failure(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|err| {
            tracing::error!(error = %err, "{}", message);
            ApiError::Persistence { message }
        })
    }
}

impl<T> OrFailure<T> for Result<T, AccessError> {
    fn or_failure(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|err| match err {
            AccessError::NotFound(resource) => ApiError::NotFound(resource),
            AccessError::Forbidden(resource) => ApiError::Forbidden(resource),
            AccessError::Store(err) => {
                tracing::error!(error = %err, "{}", message);
                ApiError::Persistence { message }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::InvalidAuthData.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InsufficientPrivilege { required: "todo:delete" }.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound(Resource::Todo).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden(Resource::Comment).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Persistence { message: "Failed to create todo" }.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiError::NotFound(Resource::TodoList).to_string(), "Todo list not found");
        assert_eq!(
            ApiError::Forbidden(Resource::TodoList).to_string(),
            "Not allowed to modify this todo list"
        );
        assert_eq!(
            ApiError::InsufficientPrivilege { required: "todolist:read" }.to_string(),
            "invalid privilege"
        );
    }

    #[test]
    fn test_access_error_conversion() {
        let res: Result<(), AccessError> = Err(AccessError::NotFound(Resource::Comment));
        let err = res.or_failure("Failed to delete comment").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(Resource::Comment)));

        let res: Result<(), AccessError> = Err(AccessError::Store(StoreError::Poisoned));
        let err = res.or_failure("Failed to delete comment").unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete comment");
    }
}
