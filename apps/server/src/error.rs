//! HTTP error responses.
//!
//! Every failing handler returns an [`ApiError`], rendered as
//! `{"error": "<message>", "code": "<CODE>"}`. Server-side failures are
//! logged with their cause and reach the client only as
//! `Failed to <operation>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use victor_core::{CoreError, ValidationError};
use victor_db::DbError;

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Cause is logged, `operation` is what the client sees.
    #[error("Failed to {operation}")]
    Internal { operation: String, cause: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn internal(operation: &str, cause: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Maps a database error for the given operation.
    pub fn from_db(operation: &str, err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} not found: {}", entity, id))
            }
            DbError::ConstraintViolation(msg) => ApiError::BadRequest(msg),
            other => ApiError::internal(operation, other),
        }
    }

    /// Maps a domain error for the given operation.
    pub fn from_core(operation: &str, err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            other => ApiError::internal(operation, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal {
            ref operation,
            ref cause,
        } = self
        {
            error!(operation = %operation, cause = %cause, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Adds the operation name to a database result.
pub trait DbResultExt<T> {
    fn or_fail(self, operation: &str) -> ApiResult<T>;
}

impl<T> DbResultExt<T> for Result<T, DbError> {
    fn or_fail(self, operation: &str) -> ApiResult<T> {
        self.map_err(|e| ApiError::from_db(operation, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_hides_cause() {
        let err = ApiError::from_db("fetch messages", DbError::QueryFailed("disk I/O".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to fetch messages");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from_db("update threat", DbError::not_found("ThreatLog", "abc"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err: ApiError = ValidationError::Required {
            field: "command".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "command is required");
    }

    #[test]
    fn test_bad_stored_stabilizers_are_internal() {
        let err = ApiError::from_core(
            "fetch parity state",
            CoreError::MalformedStabilizers("expected `[`".into()),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to fetch parity state");
    }
}
