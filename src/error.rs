//! Error types for the task store and the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use refinery::error::Kind;
use rusqlite::ErrorCode as SqliteCode;
use serde::Serialize;
use std::fmt;

/// Failures raised by the task store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced task id does not exist.
    #[error("Task not found: {0}")]
    NotFound(i64),

    /// The database could not be opened or is not accepting work right now.
    #[error("store unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),

    /// A statement failed against an open connection.
    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),

    /// Schema creation failed.
    #[error("schema setup failed: {0}")]
    Schema(#[source] refinery::Error),
}

impl StoreError {
    /// Whether waiting and trying again could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if is_connection_failure(&err) {
            StoreError::Unavailable(err)
        } else {
            StoreError::Query(err)
        }
    }
}

impl From<refinery::Error> for StoreError {
    fn from(err: refinery::Error) -> Self {
        // A busy or locked file while refinery runs must stay retryable.
        if let Kind::Connection(_, source) = err.kind()
            && let Some(cause) = source.downcast_ref::<rusqlite::Error>()
            && let Some(cause) = connection_failure(cause)
        {
            return StoreError::Unavailable(cause);
        }
        StoreError::Schema(err)
    }
}

/// Connection-class SQLite failures: the file cannot be reached or is held by someone else.
fn is_connection_failure(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            SqliteCode::CannotOpen
                | SqliteCode::DatabaseBusy
                | SqliteCode::DatabaseLocked
                | SqliteCode::NotADatabase
                | SqliteCode::SystemIoFailure
        ),
        rusqlite::Error::InvalidPath(_) => true,
        _ => false,
    }
}

/// Owned copy of a borrowed connection-class failure.
fn connection_failure(err: &rusqlite::Error) -> Option<rusqlite::Error> {
    if !is_connection_failure(err) {
        return None;
    }
    match err {
        rusqlite::Error::SqliteFailure(e, msg) => {
            Some(rusqlite::Error::SqliteFailure(*e, msg.clone()))
        }
        rusqlite::Error::InvalidPath(path) => Some(rusqlite::Error::InvalidPath(path.clone())),
        _ => None,
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error codes exposed in HTTP error bodies.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TaskNotFound,
    InvalidFieldValue,
    StoreUnavailable,
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::TaskNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidFieldValue => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured error returned by request handlers.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Task not found: {}", task_id))
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::task_not_found(id),
            StoreError::Unavailable(e) => ApiError::new(ErrorCode::StoreUnavailable, e.to_string()),
            other => ApiError::database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, detail = %self.detail, "Request failed");
        }
        (status, Json(self)).into_response()
    }
}

/// Result type for request handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
