//! Privilege gate middleware.
//! Enforces the capability bound to each route before the handler runs.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::identity::{identity_from_headers, Identity};
use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::observability::metrics;

/// Route-scoped state: header settings plus the capability the route needs.
#[derive(Clone, Debug)]
pub struct PrivilegeGate {
    settings: Arc<AuthConfig>,
    required: &'static str,
}

impl PrivilegeGate {
    pub fn new(settings: Arc<AuthConfig>, required: &'static str) -> Self {
        Self { settings, required }
    }

    /// Resolve the caller and check the route's capability.
    pub fn check(&self, headers: &HeaderMap) -> Result<Identity, ApiError> {
        let identity = match identity_from_headers(headers, &self.settings) {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!(capability = self.required, "Rejected request with invalid auth data");
                metrics::record_privilege_denied(self.required, "invalid_auth_data");
                return Err(err);
            }
        };

        if !identity.has_privilege(self.required) {
            tracing::info!(
                user_id = %identity.user_id,
                capability = self.required,
                "Privilege check failed"
            );
            metrics::record_privilege_denied(self.required, "insufficient_privilege");
            return Err(ApiError::InsufficientPrivilege { required: self.required });
        }

        tracing::debug!(
            user_id = %identity.user_id,
            capability = self.required,
            "Privilege check passed"
        );
        Ok(identity)
    }
}

/// Attaches the caller's [`Identity`] to the request on success.
pub async fn privilege_gate(
    State(gate): State<PrivilegeGate>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match gate.check(req.headers()) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
