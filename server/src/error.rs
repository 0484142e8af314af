//! HTTP error mapping.
//!
//! # Design
//! Validation failures and missing records are ordinary outcomes: handlers
//! return them as `ApiError` values and they become 400/404 responses. Only
//! backend faults and panics reach the 500 path, and the caller never sees
//! more than a generic message unless detail exposure is switched on.

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            errors: None,
            detail: None,
        }
    }
}

/// Failure outcomes of a request.
#[derive(Debug)]
pub enum ApiError {
    /// The payload violated field constraints.
    Validation(ValidationErrors),
    /// The body was not a JSON object.
    MalformedBody(String),
    /// The path id does not resolve to a record. Holds the id as sent.
    NotFound(String),
    /// A fault the caller cannot fix. `detail` is only set when exposure is on.
    Internal { detail: Option<String> },
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "unreadable request body");
        let reason = match rejection {
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON.",
            JsonRejection::JsonDataError(_) => "Request body must be a JSON object.",
            JsonRejection::MissingJsonContentType(_) => {
                "Expected request with `Content-Type: application/json`."
            }
            _ => "Request body could not be read.",
        };
        ApiError::MalformedBody(reason.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            ApiError::Validation(errors) => ErrorBody {
                error: "Validation failed".to_string(),
                errors: Some(errors.messages()),
                detail: None,
            },
            ApiError::MalformedBody(reason) => ErrorBody {
                error: "Invalid request body".to_string(),
                errors: Some(vec![reason]),
                detail: None,
            },
            ApiError::NotFound(id) => ErrorBody::message(format!("Todo with id {id} was not found.")),
            ApiError::Internal { detail } => ErrorBody {
                detail,
                ..ErrorBody::message(INTERNAL_ERROR_MESSAGE)
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}

/// Outermost boundary for panics escaping a handler.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = message, "handler panicked");
    ApiError::Internal { detail: None }.into_response()
}
