//! Domain-facing wrapper around a `TodoStore`.
//!
//! # Design
//! The repository owns the server clock, so `createdAt` is always stamped
//! here at the moment of the call and never taken from the caller. Updates
//! go through `TodoStore::replace`, which only touches `title` and
//! `is_completed`; the original `created_at` survives by construction.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::model::{NewTodo, Todo, TodoId, TodoInput};
use crate::store::{StoreError, TodoStore};

/// Source of creation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn TodoStore>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn TodoStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        self.store.list_all().await
    }

    pub async fn get(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        self.store.get_by_id(id).await
    }

    pub async fn create(&self, input: TodoInput) -> Result<Todo, StoreError> {
        let record = NewTodo {
            title: input.title,
            is_completed: input.is_completed,
            created_at: self.clock.now(),
        };
        self.store.insert(record).await
    }

    /// Returns `None` when `id` does not exist.
    pub async fn update(&self, id: TodoId, input: TodoInput) -> Result<Option<Todo>, StoreError> {
        self.store.replace(id, input).await
    }

    /// Returns `false` when `id` does not exist.
    pub async fn delete(&self, id: TodoId) -> Result<bool, StoreError> {
        self.store.remove(id).await
    }
}
