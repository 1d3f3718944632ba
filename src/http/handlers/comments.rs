use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};

use crate::auth::Identity;
use crate::error::{ApiError, OrFailure, Resource};
use crate::http::request::parse_id;
use crate::http::server::AppState;

/// `DELETE /comments/{id}`.
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "id")?;
    let comment = state
        .access
        .deletable_comment(&who, id)
        .await
        .or_failure("Failed to delete comment")?;

    if !state
        .store
        .delete_comment(comment.id)
        .await
        .or_failure("Failed to delete comment")?
    {
        return Err(ApiError::NotFound(Resource::Comment));
    }
    Ok(StatusCode::NO_CONTENT)
}
