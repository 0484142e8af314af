use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, TodoStore};
use crate::model::{NewTodo, Todo, TodoId, TodoInput};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<TodoId, Todo>,
    last_id: TodoId,
}

/// In-process store. Writers hold the lock exclusively, so readers never see
/// a half-applied update.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert(&self, record: NewTodo) -> Result<Todo, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let todo = record.with_id(table.last_id);
        table.rows.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn replace(&self, id: TodoId, fields: TodoInput) -> Result<Option<Todo>, StoreError> {
        let mut table = self.table.write().await;
        let Some(todo) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        todo.title = fields.title;
        todo.is_completed = fields.is_completed;
        Ok(Some(todo.clone()))
    }

    async fn remove(&self, id: TodoId) -> Result<bool, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }
}
