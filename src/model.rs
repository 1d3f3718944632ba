//! Domain entities and request bodies.
//!
//! All entities serialize with camelCase keys, UUID string ids and RFC 3339
//! timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A todo list, owned exclusively by the user that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub id: Uuid,
    pub title: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A todo list together with its todos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListDetail {
    #[serde(flatten)]
    pub list: TodoList,
    pub todos: Vec<Todo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub todo_list_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A todo together with its comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDetail {
    #[serde(flatten)]
    pub todo: Todo,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub todo_id: Uuid,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Grants a non-owner user visibility on a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub todo_list_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoList {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of a todo. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccessGrant {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_list_serializes_camel_case() {
        let now = Utc::now();
        let list = TodoList {
            id: Uuid::nil(),
            title: "Groceries".into(),
            owner_id: "user-a".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["ownerId"], "user-a");
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert!(json["createdAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_detail_flattens_parent() {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            title: "Milk".into(),
            description: String::new(),
            completed: false,
            todo_list_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let detail = TodoDetail { todo: todo.clone(), comments: vec![] };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Milk");
        assert_eq!(json["todoListId"], todo.todo_list_id.to_string());
        assert!(json["comments"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_update_todo_empty() {
        assert!(UpdateTodo::default().is_empty());
        let patch: UpdateTodo = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert!(!patch.is_empty());
    }
}
