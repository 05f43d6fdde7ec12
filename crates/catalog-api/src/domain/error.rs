//! Error types for the catalog API.
//!
//! Every failure reaches the caller as `{"error": "<message>"}` with one of
//! four statuses: 400 (validation), 404 (row not found), 500 (configuration
//! or store failure). 413 is produced by the body limit layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// Messages returned verbatim to callers.
pub mod messages {
    pub const GROUP_ID_REQUIRED: &str = "group_id is required";
    pub const ID_REQUIRED: &str = "id is required in JSON body";
    pub const ID_INVALID: &str = "id must be a string or integer";
    pub const ID_OUT_OF_RANGE: &str = "id is out of range";
    pub const ROW_NOT_FOUND: &str = "row not found";
    pub const NOT_CONFIGURED: &str = "SUPABASE_URL and SUPABASE_KEY are not configured";
}

/// HTTP-facing error: a status plus the message placed in the `error` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Client supplied insufficient input. Never reaches the store.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Mutation target does not exist.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, messages::ROW_NOT_FOUND)
    }

    /// Store connection settings are absent.
    pub fn configuration() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, messages::NOT_CONFIGURED)
    }

    /// Any other failure reported by the store or its transport.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: &self.message,
            }),
        )
            .into_response()
    }
}

/// Result type for handler operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Typed outcome of a store call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No store client was constructed (connection settings missing)
    #[error("{}", messages::NOT_CONFIGURED)]
    NotConfigured,

    /// The addressed row does not exist
    #[error("{}", messages::ROW_NOT_FOUND)]
    NotFound,

    /// The store answered with an error payload
    #[error("{message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a store answer (connect, timeout, TLS)
    #[error("store transport error: {0}")]
    Transport(String),

    /// The store answered with a body we could not decode
    #[error("invalid store response: {0}")]
    Decode(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotConfigured => ApiError::configuration(),
            StoreError::NotFound => ApiError::not_found(),
            e @ (StoreError::Rejected { .. }
            | StoreError::Transport(_)
            | StoreError::Decode(_)) => ApiError::store(e.to_string()),
        }
    }
}

/// Server lifecycle errors (not returned to HTTP callers)
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server loop terminated with an I/O error
    #[error("server error: {0}")]
    Serve(String),
}
