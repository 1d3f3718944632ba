//! SQLite-backed `TodoStore`.
//!
//! One connection guarded by a mutex; every call runs on tokio's blocking
//! pool so handlers never block the async workers.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::model::{AccessGrant, Comment, Todo, TodoList, UpdateTodo};
use crate::store::migrations::apply_migrations;
use crate::store::{StoreError, StoreResult, TodoStore};

const LIST_COLUMNS: &str = "id, title, owner_id, created_at, updated_at";
const TODO_COLUMNS: &str = "id, title, description, completed, todo_list_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, text, todo_id, author_id, created_at, updated_at";
const GRANT_COLUMNS: &str = "todo_list_id, user_id, created_at";

/// Shared handle to the SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the configured database and apply migrations.
    ///
    /// A path of `:memory:` opens a private in-memory database.
    pub fn open(config: &DatabaseConfig) -> StoreResult<Self> {
        let started_at = Instant::now();
        let mut conn = if config.path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(Path::new(&config.path))?
        };
        bootstrap(&mut conn, Duration::from_secs(config.busy_timeout_secs))?;

        tracing::info!(
            path = %config.path,
            duration_ms = started_at.elapsed().as_millis() as u64,
            "Database opened"
        );
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let mut conn = Connection::open_in_memory()?;
        bootstrap(&mut conn, Duration::from_secs(5))?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut *guard)
        })
        .await?
    }
}

fn bootstrap(conn: &mut Connection, busy_timeout: Duration) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)
}

fn row_to_list(row: &Row<'_>) -> rusqlite::Result<TodoList> {
    Ok(TodoList {
        id: row.get(0)?,
        title: row.get(1)?,
        owner_id: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        todo_list_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn row_to_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        text: row.get(1)?,
        todo_id: row.get(2)?,
        author_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_grant(row: &Row<'_>) -> rusqlite::Result<AccessGrant> {
    Ok(AccessGrant {
        todo_list_id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn select_todo(conn: &Connection, id: Uuid) -> StoreResult<Option<Todo>> {
    let todo = conn
        .query_row(
            &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
            params![id],
            row_to_todo,
        )
        .optional()?;
    Ok(todo)
}

/// Deletes one row by id inside its own transaction so cascades are atomic.
fn delete_cascading(conn: &mut Connection, table: &'static str, id: Uuid) -> StoreResult<bool> {
    let tx = conn.transaction()?;
    let removed = tx.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
    tx.commit()?;
    Ok(removed > 0)
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn create_list(&self, owner_id: &str, title: &str) -> StoreResult<TodoList> {
        let now = Utc::now();
        let list = TodoList {
            id: Uuid::new_v4(),
            title: title.to_string(),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.with_conn(move |conn| {
            conn.execute(
                &format!("INSERT INTO todo_lists ({LIST_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                params![list.id, list.title, list.owner_id, list.created_at, list.updated_at],
            )?;
            Ok(list)
        })
        .await
    }

    async fn find_list(&self, id: Uuid) -> StoreResult<Option<TodoList>> {
        self.with_conn(move |conn| {
            let list = conn
                .query_row(
                    &format!("SELECT {LIST_COLUMNS} FROM todo_lists WHERE id = ?1"),
                    params![id],
                    row_to_list,
                )
                .optional()?;
            Ok(list)
        })
        .await
    }

    async fn lists_visible_to(&self, user_id: &str) -> StoreResult<Vec<TodoList>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LIST_COLUMNS} FROM todo_lists
                 WHERE owner_id = ?1
                    OR EXISTS (
                        SELECT 1 FROM todo_list_access a
                        WHERE a.todo_list_id = todo_lists.id AND a.user_id = ?1
                    )
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let lists = stmt
                .query_map(params![user_id], row_to_list)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(lists)
        })
        .await
    }

    async fn delete_list(&self, id: Uuid) -> StoreResult<bool> {
        self.with_conn(move |conn| delete_cascading(conn, "todo_lists", id)).await
    }

    async fn has_grant(&self, list_id: Uuid, user_id: &str) -> StoreResult<bool> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM todo_list_access WHERE todo_list_id = ?1 AND user_id = ?2",
                    params![list_id, user_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn grant_access(&self, list_id: Uuid, user_id: &str) -> StoreResult<AccessGrant> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO todo_list_access (todo_list_id, user_id, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (todo_list_id, user_id) DO NOTHING",
                params![list_id, user_id, Utc::now()],
            )?;
            let grant = tx.query_row(
                &format!(
                    "SELECT {GRANT_COLUMNS} FROM todo_list_access
                     WHERE todo_list_id = ?1 AND user_id = ?2"
                ),
                params![list_id, user_id],
                row_to_grant,
            )?;
            tx.commit()?;
            Ok(grant)
        })
        .await
    }

    async fn revoke_access(&self, list_id: Uuid, user_id: &str) -> StoreResult<bool> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM todo_list_access WHERE todo_list_id = ?1 AND user_id = ?2",
                params![list_id, user_id],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn grants_for_list(&self, list_id: Uuid) -> StoreResult<Vec<AccessGrant>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {GRANT_COLUMNS} FROM todo_list_access
                 WHERE todo_list_id = ?1
                 ORDER BY created_at ASC, user_id ASC"
            ))?;
            let grants = stmt
                .query_map(params![list_id], row_to_grant)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(grants)
        })
        .await
    }

    async fn create_todo(&self, list_id: Uuid, title: &str, description: &str) -> StoreResult<Todo> {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            completed: false,
            todo_list_id: list_id,
            created_at: now,
            updated_at: now,
        };
        self.with_conn(move |conn| {
            conn.execute(
                &format!("INSERT INTO todos ({TODO_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                params![
                    todo.id,
                    todo.title,
                    todo.description,
                    todo.completed,
                    todo.todo_list_id,
                    todo.created_at,
                    todo.updated_at
                ],
            )?;
            Ok(todo)
        })
        .await
    }

    async fn find_todo(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        self.with_conn(move |conn| select_todo(conn, id)).await
    }

    async fn todos_in_list(&self, list_id: Uuid) -> StoreResult<Vec<Todo>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TODO_COLUMNS} FROM todos
                 WHERE todo_list_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let todos = stmt
                .query_map(params![list_id], row_to_todo)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(todos)
        })
        .await
    }

    async fn update_todo(&self, id: Uuid, patch: &UpdateTodo) -> StoreResult<Option<Todo>> {
        let patch = patch.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let Some(mut todo) = select_todo(&tx, id)? else {
                return Ok(None);
            };
            if let Some(title) = patch.title {
                todo.title = title;
            }
            if let Some(description) = patch.description {
                todo.description = description;
            }
            if let Some(completed) = patch.completed {
                todo.completed = completed;
            }
            todo.updated_at = Utc::now();

            tx.execute(
                "UPDATE todos
                 SET title = ?2, description = ?3, completed = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![todo.id, todo.title, todo.description, todo.completed, todo.updated_at],
            )?;
            tx.commit()?;
            Ok(Some(todo))
        })
        .await
    }

    async fn delete_todo(&self, id: Uuid) -> StoreResult<bool> {
        self.with_conn(move |conn| delete_cascading(conn, "todos", id)).await
    }

    async fn create_comment(&self, todo_id: Uuid, author_id: &str, text: &str) -> StoreResult<Comment> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            text: text.to_string(),
            todo_id,
            author_id: author_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.with_conn(move |conn| {
            conn.execute(
                &format!("INSERT INTO comments ({COMMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    comment.id,
                    comment.text,
                    comment.todo_id,
                    comment.author_id,
                    comment.created_at,
                    comment.updated_at
                ],
            )?;
            Ok(comment)
        })
        .await
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        self.with_conn(move |conn| {
            let comment = conn
                .query_row(
                    &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
                    params![id],
                    row_to_comment,
                )
                .optional()?;
            Ok(comment)
        })
        .await
    }

    async fn comments_on_todo(&self, todo_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMMENT_COLUMNS} FROM comments
                 WHERE todo_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let comments = stmt
                .query_map(params![todo_id], row_to_comment)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(comments)
        })
        .await
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        self.with_conn(move |conn| delete_cascading(conn, "comments", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_crud() {
        let store = SqliteStore::open_in_memory().unwrap();
        let list = store.create_list("alice", "Groceries").await.unwrap();

        let found = store.find_list(list.id).await.unwrap().unwrap();
        assert_eq!(found, list);

        assert!(store.delete_list(list.id).await.unwrap());
        assert!(store.find_list(list.id).await.unwrap().is_none());
        assert!(!store.delete_list(list.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_visibility_owner_or_grant() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mine = store.create_list("alice", "Mine").await.unwrap();
        let shared = store.create_list("bob", "Shared").await.unwrap();
        let _hidden = store.create_list("bob", "Hidden").await.unwrap();
        store.grant_access(shared.id, "alice").await.unwrap();

        let visible = store.lists_visible_to("alice").await.unwrap();
        let ids: Vec<_> = visible.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![mine.id, shared.id]);
    }

    #[tokio::test]
    async fn test_grant_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let list = store.create_list("alice", "L").await.unwrap();

        let first = store.grant_access(list.id, "bob").await.unwrap();
        let second = store.grant_access(list.id, "bob").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.grants_for_list(list.id).await.unwrap().len(), 1);

        assert!(store.has_grant(list.id, "bob").await.unwrap());
        assert!(store.revoke_access(list.id, "bob").await.unwrap());
        assert!(!store.has_grant(list.id, "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_list_cascades() {
        let store = SqliteStore::open_in_memory().unwrap();
        let list = store.create_list("alice", "L").await.unwrap();
        store.grant_access(list.id, "bob").await.unwrap();
        let todo = store.create_todo(list.id, "T", "").await.unwrap();
        let comment = store.create_comment(todo.id, "bob", "hi").await.unwrap();

        assert!(store.delete_list(list.id).await.unwrap());
        assert!(store.find_todo(todo.id).await.unwrap().is_none());
        assert!(store.find_comment(comment.id).await.unwrap().is_none());
        assert!(!store.has_grant(list.id, "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_todo_requires_existing_list() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.create_todo(Uuid::new_v4(), "T", "").await.unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[tokio::test]
    async fn test_update_todo_partial() {
        let store = SqliteStore::open_in_memory().unwrap();
        let list = store.create_list("alice", "L").await.unwrap();
        let todo = store.create_todo(list.id, "Write", "draft").await.unwrap();

        let patch = UpdateTodo { completed: Some(true), ..Default::default() };
        let updated = store.update_todo(todo.id, &patch).await.unwrap().unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Write");
        assert_eq!(updated.description, "draft");
        assert!(updated.updated_at >= todo.updated_at);

        assert!(store.update_todo(Uuid::new_v4(), &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_owner_is_immutable() {
        let store = SqliteStore::open_in_memory().unwrap();
        let list = store.create_list("alice", "L").await.unwrap();
        let id = list.id;

        let result = store
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE todo_lists SET owner_id = 'mallory' WHERE id = ?1",
                    params![id],
                )?;
                Ok(())
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.find_list(id).await.unwrap().unwrap().owner_id, "alice");
    }

    #[tokio::test]
    async fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("todo.db").to_string_lossy().into_owned(),
            busy_timeout_secs: 1,
        };
        let list = {
            let store = SqliteStore::open(&config).unwrap();
            store.create_list("alice", "Persisted").await.unwrap()
        };
        let reopened = SqliteStore::open(&config).unwrap();
        assert_eq!(reopened.find_list(list.id).await.unwrap().unwrap().title, "Persisted");
    }
}
