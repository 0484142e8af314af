use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{self, header, Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use todo_server::model::{NewTodo, TodoInput};
use todo_server::{
    app, AppState, ErrorBody, Repository, SqliteStore, StoreError, Todo, TodoId, TodoStore,
};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// Send one request through a long-lived router so state carries over.
async fn send(router: &mut axum::Router, request: Request<String>) -> axum::response::Response {
    ServiceExt::<Request<String>>::ready(router)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap()
}

async fn create(router: &mut axum::Router, body: &str) -> Todo {
    let resp = send(router, json_request("POST", "/api/todos", body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app(AppState::in_memory())
        .oneshot(empty_request("GET", "/api/todos"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn list_todos_returns_every_record() {
    let mut router = app(AppState::in_memory());
    create(&mut router, r#"{"title":"Test Todo 1"}"#).await;
    create(&mut router, r#"{"title":"Test Todo 2","isCompleted":true}"#).await;

    let resp = send(&mut router, empty_request("GET", "/api/todos")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 2);
    assert!(todos.iter().any(|t| t.title == "Test Todo 1" && !t.is_completed));
    assert!(todos.iter().any(|t| t.title == "Test Todo 2" && t.is_completed));
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_location() {
    let before = Utc::now();
    let resp = app(AppState::in_memory())
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"New Todo"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
    let todo: Todo = body_json(resp).await;
    assert!(todo.id > 0);
    assert_eq!(location, format!("/api/todos/{}", todo.id));
    assert_eq!(todo.title, "New Todo");
    assert!(!todo.is_completed);
    assert!((todo.created_at - before).abs() < Duration::seconds(5));
}

#[tokio::test]
async fn create_todo_serializes_camel_case() {
    let resp = app(AppState::in_memory())
        .oneshot(json_request(
            "POST",
            "/api/todos",
            r#"{"title":"Shape","isCompleted":true}"#,
        ))
        .await
        .unwrap();

    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["title"], "Shape");
    assert_eq!(json["isCompleted"], true);
    assert!(json["id"].is_i64());
    assert!(json["createdAt"].is_string());
}

#[tokio::test]
async fn create_todo_ignores_client_created_at() {
    let resp = app(AppState::in_memory())
        .oneshot(json_request(
            "POST",
            "/api/todos",
            r#"{"title":"Time travel","createdAt":"1999-01-01T00:00:00Z","id":500}"#,
        ))
        .await
        .unwrap();

    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 1);
    assert!(Utc::now() - todo.created_at < Duration::seconds(5));
}

#[tokio::test]
async fn create_todo_empty_title_returns_400() {
    let resp = app(AppState::in_memory())
        .oneshot(json_request("POST", "/api/todos", r#"{"title":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "Validation failed");
    let errors = body.errors.unwrap();
    assert!(errors.iter().any(|e| e.contains("title")));
}

#[tokio::test]
async fn create_todo_missing_title_returns_400() {
    let resp = app(AppState::in_memory())
        .oneshot(json_request("POST", "/api/todos", r#"{"isCompleted":false}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_todo_title_length_boundary() {
    let mut router = app(AppState::in_memory());

    let at_limit = serde_json::json!({ "title": "A".repeat(200) }).to_string();
    let resp = send(&mut router, json_request("POST", "/api/todos", &at_limit)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let over_limit = serde_json::json!({ "title": "A".repeat(201) }).to_string();
    let resp = send(&mut router, json_request("POST", "/api/todos", &over_limit)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&mut router, empty_request("GET", "/api/todos")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
}

#[tokio::test]
async fn create_todo_whitespace_title_returns_400() {
    let resp = app(AppState::in_memory())
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"    "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_todo_non_boolean_completed_returns_400() {
    let resp = app(AppState::in_memory())
        .oneshot(json_request(
            "POST",
            "/api/todos",
            r#"{"title":"ok","isCompleted":"true"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(
        body.errors.unwrap(),
        vec!["isCompleted: The IsCompleted field must be a boolean.".to_string()]
    );
}

#[tokio::test]
async fn create_todo_malformed_json_returns_400() {
    let resp = app(AppState::in_memory())
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "Invalid request body");
    assert_eq!(
        body.errors,
        Some(vec!["Request body is not valid JSON.".to_string()])
    );
}

#[tokio::test]
async fn create_todo_non_object_body_hides_internal_type_names() {
    let mut router = app(AppState::in_memory());
    for raw in [r#""just a title""#, "42", r#"{"title": 5}"#] {
        let resp = send(&mut router, json_request("POST", "/api/todos", raw)).await;
        let status = resp.status();
        let text = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
        assert!(!text.contains("TodoPayload"), "{raw}: {text}");
        assert!(!text.contains("invalid type"), "{raw}: {text}");
    }
}

#[tokio::test]
async fn create_todo_without_json_content_type_returns_400() {
    let resp = app(AppState::in_memory())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/todos")
                .body(r#"{"title":"x"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(
        body.errors,
        Some(vec![
            "Expected request with `Content-Type: application/json`.".to_string()
        ])
    );
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found() {
    let resp = app(AppState::in_memory())
        .oneshot(empty_request("GET", "/api/todos/9999"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "Todo with id 9999 was not found.");
}

#[tokio::test]
async fn get_todo_non_numeric_id_returns_404() {
    let resp = app(AppState::in_memory())
        .oneshot(empty_request("GET", "/api/todos/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_canonical_ids_do_not_alias_a_record() {
    let mut router = app(AppState::in_memory());
    let todo = create(&mut router, r#"{"title":"only one"}"#).await;
    assert_eq!(todo.id, 1);

    for path in ["/api/todos/+1", "/api/todos/0001", "/api/todos/01"] {
        let resp = send(&mut router, empty_request("GET", path)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {path}");

        let resp = send(&mut router, json_request("PUT", path, r#"{"title":"alias"}"#)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "PUT {path}");

        let resp = send(&mut router, empty_request("DELETE", path)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "DELETE {path}");
    }

    let resp = send(&mut router, empty_request("GET", "/api/todos/1")).await;
    assert_eq!(body_json::<Todo>(resp).await, todo);
}

// --- update ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app(AppState::in_memory())
        .oneshot(json_request(
            "PUT",
            "/api/todos/9999",
            r#"{"title":"Updated Title","isCompleted":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_todo_invalid_payload_returns_400() {
    let mut router = app(AppState::in_memory());
    let created = create(&mut router, r#"{"title":"Original Title"}"#).await;

    let resp = send(
        &mut router,
        json_request(
            "PUT",
            &format!("/api/todos/{}", created.id),
            r#"{"title":"","isCompleted":true}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&mut router, empty_request("GET", &format!("/api/todos/{}", created.id))).await;
    let unchanged: Todo = body_json(resp).await;
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn update_todo_preserves_created_at() {
    let mut router = app(AppState::in_memory());
    let created = create(&mut router, r#"{"title":"Keep my timestamp"}"#).await;

    let resp = send(
        &mut router,
        json_request(
            "PUT",
            &format!("/api/todos/{}", created.id),
            r#"{"title":"Renamed","isCompleted":true,"createdAt":"2001-01-01T00:00:00Z"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Renamed");
    assert!(updated.is_completed);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn update_todo_omitted_completed_resets_to_false() {
    let mut router = app(AppState::in_memory());
    let created = create(&mut router, r#"{"title":"Done","isCompleted":true}"#).await;

    let resp = send(
        &mut router,
        json_request("PUT", &format!("/api/todos/{}", created.id), r#"{"title":"Done"}"#),
    )
    .await;
    let updated: Todo = body_json(resp).await;
    assert!(!updated.is_completed);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app(AppState::in_memory())
        .oneshot(empty_request("DELETE", "/api/todos/9999"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_twice_returns_204_then_404() {
    let mut router = app(AppState::in_memory());
    let created = create(&mut router, r#"{"title":"Todo to Delete"}"#).await;
    let uri = format!("/api/todos/{}", created.id);

    let resp = send(&mut router, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&mut router, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

async fn grocery_lifecycle(mut router: axum::Router) {
    let created = create(&mut router, r#"{"title":"Buy groceries"}"#).await;
    assert!(!created.is_completed);
    let uri = format!("/api/todos/{}", created.id);

    let resp = send(&mut router, empty_request("GET", &uri)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched, created);

    let resp = send(
        &mut router,
        json_request("PUT", &uri, r#"{"title":"Buy groceries","isCompleted":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let toggled: Todo = body_json(resp).await;
    assert!(toggled.is_completed);
    assert_eq!(toggled.title, "Buy groceries");

    let resp = send(&mut router, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&mut router, empty_request("GET", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&mut router, empty_request("GET", "/api/todos")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn crud_lifecycle_in_memory() {
    grocery_lifecycle(app(AppState::in_memory())).await;
}

#[tokio::test]
async fn crud_lifecycle_sqlite() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    grocery_lifecycle(app(AppState::new(Repository::new(store)))).await;
}

// --- ambient routes ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app(AppState::in_memory())
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn index_serves_banner() {
    let resp = app(AppState::in_memory())
        .oneshot(empty_request("GET", "/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
    assert_eq!(text, "Todo API. See /api/todos.");
}

// --- internal failures ---

/// Store whose every call fails, or panics when `panic` is set.
struct BrokenStore {
    panic: bool,
}

impl BrokenStore {
    fn fail(&self) -> StoreError {
        if self.panic {
            panic!("store invariant violated");
        }
        StoreError::Sqlite(rusqlite::Error::InvalidQuery)
    }
}

#[async_trait]
impl TodoStore for BrokenStore {
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        Err(self.fail())
    }

    async fn get_by_id(&self, _id: TodoId) -> Result<Option<Todo>, StoreError> {
        Err(self.fail())
    }

    async fn insert(&self, _record: NewTodo) -> Result<Todo, StoreError> {
        Err(self.fail())
    }

    async fn replace(&self, _id: TodoId, _fields: TodoInput) -> Result<Option<Todo>, StoreError> {
        Err(self.fail())
    }

    async fn remove(&self, _id: TodoId) -> Result<bool, StoreError> {
        Err(self.fail())
    }
}

fn broken_app(panic: bool, expose: bool) -> axum::Router {
    let repository = Repository::new(Arc::new(BrokenStore { panic }));
    app(AppState::new(repository).with_error_details(expose))
}

#[tokio::test]
async fn store_failure_returns_generic_500() {
    let resp = broken_app(false, false)
        .oneshot(empty_request("GET", "/api/todos"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "An unexpected error occurred.");
    assert!(body.detail.is_none());
}

#[tokio::test]
async fn store_failure_detail_when_exposed() {
    let resp = broken_app(false, true)
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = body_json(resp).await;
    assert!(body.detail.is_some());
}

#[tokio::test]
async fn validation_runs_before_store_is_touched() {
    let resp = broken_app(false, false)
        .oneshot(json_request("POST", "/api/todos", r#"{"title":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn handler_panic_returns_generic_500() {
    let resp = broken_app(true, true)
        .oneshot(empty_request("DELETE", "/api/todos/1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "An unexpected error occurred.");
    assert!(body.detail.is_none());
}
