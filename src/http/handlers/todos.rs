use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::auth::Identity;
use crate::error::{ApiError, OrFailure, Resource};
use crate::http::request::{check_length, json_body, parse_id};
use crate::http::server::AppState;
use crate::model::{Comment, CreateComment, Todo, TodoDetail, UpdateTodo};

use super::limits;

/// `GET /todos/{id}` with the todo's comments.
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<TodoDetail>, ApiError> {
    let id = parse_id(&id, "id")?;
    let todo = state
        .access
        .readable_todo(&who, id)
        .await
        .or_failure("Failed to fetch todo")?;
    let comments = state
        .store
        .comments_on_todo(todo.id)
        .await
        .or_failure("Failed to fetch todo")?;

    Ok(Json(TodoDetail { todo, comments }))
}

/// `PATCH /todos/{id}`: title, description and completion.
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id, "id")?;
    let patch = json_body(payload)?;
    if patch.is_empty() {
        return Err(ApiError::Validation(
            "body must have at least one of title, description, completed".to_string(),
        ));
    }
    if let Some(title) = &patch.title {
        check_length("title", title, 1, limits::TODO_TITLE_MAX)?;
    }
    if let Some(description) = &patch.description {
        check_length("description", description, 0, limits::TODO_DESCRIPTION_MAX)?;
    }

    let todo = state
        .access
        .updatable_todo(&who, id)
        .await
        .or_failure("Failed to update todo")?;

    state
        .store
        .update_todo(todo.id, &patch)
        .await
        .or_failure("Failed to update todo")?
        .map(Json)
        .ok_or(ApiError::NotFound(Resource::Todo))
}

/// `DELETE /todos/{id}`, cascading to comments.
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "id")?;
    let todo = state
        .access
        .deletable_todo(&who, id)
        .await
        .or_failure("Failed to delete todo")?;

    if !state.store.delete_todo(todo.id).await.or_failure("Failed to delete todo")? {
        return Err(ApiError::NotFound(Resource::Todo));
    }

    tracing::info!(todo_id = %todo.id, user_id = %who.user_id, "Todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /todos/{id}/comments`. The caller becomes the author.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<CreateComment>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let id = parse_id(&id, "id")?;
    let body = json_body(payload)?;
    check_length("text", &body.text, 1, limits::COMMENT_TEXT_MAX)?;

    let todo = state
        .access
        .commentable_todo(&who, id)
        .await
        .or_failure("Failed to create comment")?;

    let comment = state
        .store
        .create_comment(todo.id, &who.user_id, &body.text)
        .await
        .or_failure("Failed to create comment")?;
    Ok(Json(comment))
}
