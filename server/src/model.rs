//! Domain types for the todo service.
//!
//! # Design
//! `Todo` is the only entity and doubles as the wire representation: field
//! names are camelCase on the wire (`isCompleted`, `createdAt`). Write
//! payloads arrive as `TodoPayload`, a deliberately loose shape whose fields
//! hold raw JSON so that `validation::validate` can report every field error
//! instead of failing on the first type mismatch during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primary key assigned by the record store.
pub type TodoId = i64;

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// A persisted todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A record about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl NewTodo {
    pub fn with_id(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            is_completed: self.is_completed,
            created_at: self.created_at,
        }
    }
}

/// Validated write input: the only fields a caller may set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoInput {
    pub title: String,
    pub is_completed: bool,
}

/// Raw request body for `POST /api/todos` and `PUT /api/todos/{id}`.
///
/// Unknown fields such as `id` or `createdAt` are ignored. A JSON `null` is
/// indistinguishable from an absent field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TodoPayload {
    #[serde(alias = "Title")]
    pub title: Option<Value>,
    #[serde(rename = "isCompleted", alias = "IsCompleted")]
    pub is_completed: Option<Value>,
}
