use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::auth::Identity;
use crate::error::{ApiError, OrFailure, Resource};
use crate::http::request::{check_length, json_body, parse_id};
use crate::http::server::AppState;
use crate::model::{CreateTodo, CreateTodoList, Todo, TodoList, TodoListDetail};

use super::limits;

/// `POST /todolists`. The caller becomes the owner.
pub async fn create_todo_list(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    payload: Result<Json<CreateTodoList>, JsonRejection>,
) -> Result<Json<TodoList>, ApiError> {
    let body = json_body(payload)?;
    check_length("title", &body.title, 1, limits::LIST_TITLE_MAX)?;

    let list = state
        .store
        .create_list(&who.user_id, &body.title)
        .await
        .or_failure("Failed to create todo list")?;

    tracing::info!(list_id = %list.id, owner = %who.user_id, "Todo list created");
    Ok(Json(list))
}

/// `GET /todolists`: lists the caller owns or has been granted.
pub async fn list_todo_lists(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
) -> Result<Json<Vec<TodoList>>, ApiError> {
    let lists = state
        .access
        .visible_lists(&who)
        .await
        .or_failure("Failed to fetch todo lists")?;
    Ok(Json(lists))
}

/// `GET /todolists/{id}` with the list's todos.
pub async fn get_todo_list(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<TodoListDetail>, ApiError> {
    let id = parse_id(&id, "id")?;
    let list = state
        .access
        .readable_list(&who, id)
        .await
        .or_failure("Failed to fetch todo list")?;
    let todos = state
        .store
        .todos_in_list(list.id)
        .await
        .or_failure("Failed to fetch todo list")?;

    Ok(Json(TodoListDetail { list, todos }))
}

/// `DELETE /todolists/{id}`, cascading to todos and comments.
pub async fn delete_todo_list(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "id")?;
    let list = state
        .access
        .deletable_list(&who, id)
        .await
        .or_failure("Failed to delete todo list")?;

    let removed = state
        .store
        .delete_list(list.id)
        .await
        .or_failure("Failed to delete todo list")?;
    if !removed {
        return Err(ApiError::NotFound(Resource::TodoList));
    }

    tracing::info!(list_id = %list.id, user_id = %who.user_id, "Todo list deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /todolists/{id}/todos`.
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(who): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id, "id")?;
    let body = json_body(payload)?;
    check_length("title", &body.title, 1, limits::TODO_TITLE_MAX)?;
    let description = body.description.unwrap_or_default();
    check_length("description", &description, 0, limits::TODO_DESCRIPTION_MAX)?;

    let list = state
        .access
        .writable_list(&who, id)
        .await
        .or_failure("Failed to create todo")?;

    let todo = state
        .store
        .create_todo(list.id, &body.title, &description)
        .await
        .or_failure("Failed to create todo")?;
    Ok(Json(todo))
}
