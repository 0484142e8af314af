//! Axum handlers for `/api/todos`.
//!
//! Path ids are parsed by hand so that a non-numeric id is reported the same
//! way as an unknown one: it can never resolve to a record. Write payloads are
//! validated before the id is looked up.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::model::{Todo, TodoId, TodoInput, TodoPayload};
use crate::validation::validate;
use crate::AppState;

type Payload = Result<Json<TodoPayload>, JsonRejection>;

/// Only the canonical decimal form addresses a todo: `+1` and `0001` do not.
fn parse_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse::<TodoId>()
        .ok()
        .filter(|id| id.to_string() == raw)
        .ok_or_else(|| ApiError::NotFound(raw.to_string()))
}

fn read_payload(payload: Payload) -> Result<TodoInput, ApiError> {
    let Json(payload) = payload?;
    validate(&payload).map_err(|errors| {
        tracing::debug!(%errors, "rejected todo payload");
        ApiError::from(errors)
    })
}

/// Location of a todo resource.
pub fn todo_location(id: TodoId) -> String {
    format!("/api/todos/{id}")
}

pub async fn index() -> &'static str {
    "Todo API. See /api/todos."
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state
        .repository
        .list()
        .await
        .map_err(|e| state.internal_error(e))?;
    Ok(Json(todos))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&raw_id)?;
    state
        .repository
        .get(id)
        .await
        .map_err(|e| state.internal_error(e))?
        .map(Json)
        .ok_or(ApiError::NotFound(raw_id))
}

pub async fn create_todo(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<impl IntoResponse, ApiError> {
    let input = read_payload(payload)?;
    let todo = state
        .repository
        .create(input)
        .await
        .map_err(|e| state.internal_error(e))?;
    tracing::info!(id = todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, todo_location(todo.id))],
        Json(todo),
    ))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Payload,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&raw_id)?;
    let input = read_payload(payload)?;
    let todo = state
        .repository
        .update(id, input)
        .await
        .map_err(|e| state.internal_error(e))?
        .ok_or(ApiError::NotFound(raw_id))?;
    tracing::info!(id, "todo updated");
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    let removed = state
        .repository
        .delete(id)
        .await
        .map_err(|e| state.internal_error(e))?;
    if !removed {
        return Err(ApiError::NotFound(raw_id));
    }
    tracing::info!(id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}
