//! Owner-only management of a list's access grants.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::auth::Identity;
use crate::error::{ApiError, OrFailure, Resource};
use crate::http::request::{check_length, json_body, parse_id};
use crate::http::server::AppState;
use crate::model::{AccessGrant, CreateAccessGrant};

use super::limits;

/// `GET /todolists/{id}/access`.
pub async fn list_grants(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AccessGrant>>, ApiError> {
    let id = parse_id(&id, "id")?;
    let list = state
        .access
        .shareable_list(&who, id)
        .await
        .or_failure("Failed to fetch access grants")?;

    let grants = state
        .store
        .grants_for_list(list.id)
        .await
        .or_failure("Failed to fetch access grants")?;
    Ok(Json(grants))
}

/// `POST /todolists/{id}/access`. Granting twice returns the same grant.
pub async fn grant_access(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<CreateAccessGrant>, JsonRejection>,
) -> Result<Json<AccessGrant>, ApiError> {
    let id = parse_id(&id, "id")?;
    let body = json_body(payload)?;
    let grantee = body.user_id.trim();
    check_length("userId", grantee, 1, limits::USER_ID_MAX)?;

    let list = state
        .access
        .shareable_list(&who, id)
        .await
        .or_failure("Failed to grant access")?;
    if grantee == list.owner_id {
        return Err(ApiError::Validation(
            "body/userId must not be the list owner".to_string(),
        ));
    }

    let grant = state
        .store
        .grant_access(list.id, grantee)
        .await
        .or_failure("Failed to grant access")?;

    tracing::info!(list_id = %list.id, grantee = %grantee, "Access granted");
    Ok(Json(grant))
}

/// `DELETE /todolists/{id}/access/{user_id}`.
pub async fn revoke_access(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "id")?;
    let grantee = user_id.trim();
    if grantee.is_empty() {
        return Err(ApiError::Validation(
            "params/user_id must NOT have fewer than 1 characters".to_string(),
        ));
    }

    let list = state
        .access
        .shareable_list(&who, id)
        .await
        .or_failure("Failed to revoke access")?;

    if !state
        .store
        .revoke_access(list.id, grantee)
        .await
        .or_failure("Failed to revoke access")?
    {
        return Err(ApiError::NotFound(Resource::AccessGrant));
    }

    tracing::info!(list_id = %list.id, grantee = %grantee, "Access revoked");
    Ok(StatusCode::NO_CONTENT)
}
