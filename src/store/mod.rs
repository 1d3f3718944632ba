//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → access resolver (read-only lookups)
//!     → TodoStore (one logical mutation per request)
//!     → sqlite.rs (rusqlite on the blocking pool)
//! ```
//!
//! # Invariants
//! - Foreign keys are enforced; deleting a parent cascades to its children
//!   inside a single transaction
//! - A list's owner never changes after creation

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{AccessGrant, Comment, Todo, TodoList, UpdateTodo};

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteStore;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations needed by the API.
///
/// Lookups return `Ok(None)` for absent rows; deletes return whether a row
/// was removed.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create_list(&self, owner_id: &str, title: &str) -> StoreResult<TodoList>;
    async fn find_list(&self, id: Uuid) -> StoreResult<Option<TodoList>>;
    /// Lists owned by the user or shared with them, oldest first.
    async fn lists_visible_to(&self, user_id: &str) -> StoreResult<Vec<TodoList>>;
    /// Deletes the list with its grants, todos and their comments.
    async fn delete_list(&self, id: Uuid) -> StoreResult<bool>;

    async fn has_grant(&self, list_id: Uuid, user_id: &str) -> StoreResult<bool>;
    /// Inserts a grant, or returns the existing one.
    async fn grant_access(&self, list_id: Uuid, user_id: &str) -> StoreResult<AccessGrant>;
    async fn revoke_access(&self, list_id: Uuid, user_id: &str) -> StoreResult<bool>;
    async fn grants_for_list(&self, list_id: Uuid) -> StoreResult<Vec<AccessGrant>>;

    async fn create_todo(&self, list_id: Uuid, title: &str, description: &str) -> StoreResult<Todo>;
    async fn find_todo(&self, id: Uuid) -> StoreResult<Option<Todo>>;
    async fn todos_in_list(&self, list_id: Uuid) -> StoreResult<Vec<Todo>>;
    async fn update_todo(&self, id: Uuid, patch: &UpdateTodo) -> StoreResult<Option<Todo>>;
    /// Deletes the todo with its comments.
    async fn delete_todo(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_comment(&self, todo_id: Uuid, author_id: &str, text: &str) -> StoreResult<Comment>;
    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn comments_on_todo(&self, todo_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool>;
}
