//! HTTP service for creating, listing, updating, and deleting todos.
//!
//! # Overview
//! Requests flow through `handlers` (HTTP mapping), `validation` (write
//! payload checks), `repository` (timestamps, domain calls) and finally a
//! `store::TodoStore` backend. The router is built from an explicit
//! `AppState`; nothing is looked up globally.
//!
//! # Design
//! - Missing records and invalid payloads are values, not errors thrown
//!   through the stack. Only backend faults take the 500 path.
//! - `app` wraps the router in a panic boundary and request tracing so tests
//!   driving it with `tower::ServiceExt::oneshot` see the same behavior as
//!   the binary.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod repository;
pub mod store;
pub mod telemetry;
pub mod validation;

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorBody};
pub use model::{Todo, TodoId};
pub use repository::Repository;
pub use store::{MemoryStore, SqliteStore, StoreError, TodoStore};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub repository: Repository,
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            expose_error_details: false,
        }
    }

    /// Fresh state over an empty `MemoryStore`.
    pub fn in_memory() -> Self {
        Self::new(Repository::new(Arc::new(MemoryStore::new())))
    }

    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    /// Log an unexpected fault and turn it into a 500.
    pub fn internal_error(&self, err: impl Display) -> ApiError {
        tracing::error!(error = %err, "request failed");
        ApiError::Internal {
            detail: self.expose_error_details.then(|| err.to_string()),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(
            "/api/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/api/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

/// Like `run`, but stops accepting connections once `shutdown` resolves and
/// drains in-flight requests.
pub async fn run_until<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
