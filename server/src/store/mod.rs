//! Record store abstraction and its backends.
//!
//! # Design
//! `TodoStore` is the only seam between the service and persistence. A
//! missing record is never an error: lookups return `Option` and removal
//! returns `bool`, so `StoreError` is reserved for backend faults. Each call
//! is atomic with respect to a single record.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::model::{NewTodo, Todo, TodoId, TodoInput};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Backend faults. Not-found is expressed through return values instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Keyed storage for todo records.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All records in ascending id order.
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError>;

    async fn get_by_id(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;

    /// Store `record` under the next unused id.
    async fn insert(&self, record: NewTodo) -> Result<Todo, StoreError>;

    /// Overwrite the mutable fields of `id`. Returns `None` if no such record.
    async fn replace(&self, id: TodoId, fields: TodoInput) -> Result<Option<Todo>, StoreError>;

    /// Returns `true` if a record existed and was removed.
    async fn remove(&self, id: TodoId) -> Result<bool, StoreError>;
}
