//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because callers act on
//! them: one means the id is gone, the other carries messages to show next
//! to the offending field. Every other unexpected status lands in
//! `HttpError` with the raw status code and body.

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404. The requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 400 with a structured error body.
    #[error("{message}: {}", .errors.join("; "))]
    Validation {
        message: String,
        errors: Vec<String>,
    },

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
