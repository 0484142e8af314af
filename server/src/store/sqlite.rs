use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use super::{StoreError, TodoStore};
use crate::model::{NewTodo, Todo, TodoId, TodoInput};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 200),
        is_completed INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );
";

const COLUMNS: &str = "id, title, is_completed, created_at";

/// SQLite-backed store. All statements run on one connection; the mutex
/// keeps them from interleaving.
///
/// `AUTOINCREMENT` keeps ids strictly increasing even after the highest row
/// is deleted.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Private, non-persistent database. Contents vanish with the store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn read_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    let created_at: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        is_completed: row.get(2)?,
        created_at,
    })
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM todos ORDER BY id"))?;
        let todos = stmt
            .query_map([], read_todo)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(todos)
    }

    async fn get_by_id(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let conn = self.conn.lock().await;
        let todo = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM todos WHERE id = ?1"),
                params![id],
                read_todo,
            )
            .optional()?;
        Ok(todo)
    }

    async fn insert(&self, record: NewTodo) -> Result<Todo, StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO todos (title, is_completed, created_at) VALUES (?1, ?2, ?3)",
            params![
                record.title,
                record.is_completed,
                encode_timestamp(&record.created_at)
            ],
        )?;
        Ok(record.with_id(conn.last_insert_rowid()))
    }

    async fn replace(&self, id: TodoId, fields: TodoInput) -> Result<Option<Todo>, StoreError> {
        let conn = self.conn.lock().await;
        let todo = conn
            .query_row(
                &format!(
                    "UPDATE todos SET title = ?2, is_completed = ?3 WHERE id = ?1 RETURNING {COLUMNS}"
                ),
                params![id, fields.title, fields.is_completed],
                read_todo,
            )
            .optional()?;
        Ok(todo)
    }

    async fn remove(&self, id: TodoId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let removed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}
