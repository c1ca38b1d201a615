//! Error types for the exercise server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    /// No exercise directory for this bucket/code, or the pair is not a
    /// valid identifier.
    #[error("Exercise not found: {bucket}/{exercise_code}")]
    ExerciseNotFound {
        bucket: String,
        exercise_code: String,
    },

    #[error("Exercise index.md not found: {bucket}/{exercise_code}")]
    IndexNotFound {
        bucket: String,
        exercise_code: String,
    },

    /// A file or route that does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to read index.md: {0}")]
    ReadFailed(String),

    #[error("Failed to list exercises: {0}")]
    ListFailed(String),

    /// Server configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn exercise_not_found(bucket: &str, exercise_code: &str) -> Self {
        Self::ExerciseNotFound {
            bucket: bucket.to_string(),
            exercise_code: exercise_code.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::ExerciseNotFound { .. }
            | ServerError::IndexNotFound { .. }
            | ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::ReadFailed(_)
            | ServerError::ListFailed(_)
            | ServerError::Config(_)
            | ServerError::Io(_)
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::ExerciseNotFound { .. } => "exercise_not_found",
            ServerError::IndexNotFound { .. } => "index_not_found",
            ServerError::NotFound(_) => "not_found",
            ServerError::ReadFailed(_) => "read_error",
            ServerError::ListFailed(_) => "list_error",
            ServerError::Config(_) => "config_error",
            ServerError::Io(_) => "io_error",
            ServerError::Internal(_) => "internal_error",
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ServerError::ExerciseNotFound {
                bucket,
                exercise_code,
            } => json!({
                "error": "Exercise not found",
                "bucket": bucket,
                "exercise_code": exercise_code
            }),
            ServerError::IndexNotFound {
                bucket,
                exercise_code,
            } => json!({
                "error": "Exercise index.md not found",
                "bucket": bucket,
                "exercise_code": exercise_code
            }),
            ServerError::NotFound(message) => json!({
                "error": "Resource not found",
                "message": message
            }),
            ServerError::ReadFailed(_) | ServerError::ListFailed(_) => json!({
                "error": self.to_string()
            }),
            ServerError::Config(_) | ServerError::Io(_) | ServerError::Internal(_) => json!({
                "error": "Internal server error",
                "message": self.to_string()
            }),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{} ({})", self, self.error_type());
        } else {
            log::debug!("{} ({})", self, self.error_type());
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServerError::exercise_not_found("b", "c").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::ReadFailed("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bodies() {
        assert_eq!(
            ServerError::exercise_not_found("default", "042").body(),
            json!({"error": "Exercise not found", "bucket": "default", "exercise_code": "042"})
        );
        assert_eq!(
            ServerError::ListFailed("denied".into()).body(),
            json!({"error": "Failed to list exercises: denied"})
        );
    }
}
