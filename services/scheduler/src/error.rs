//! Custom error types for the scheduler API

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::repositories::RepositoryError;
use crate::services::ServiceError;

/// Custom error type for the scheduler API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Referenced entity missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business rule rejected the request
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Malformed input
    #[error("Validation failure: {0}")]
    Validation(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request could not be extracted (malformed JSON, path or query)
    #[error("Rejected request: {1}")]
    Rejected(StatusCode, String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::BusinessRuleViolation(msg) => {
                warn!("Business rule failed: {}", msg);
                ApiError::BusinessRule(msg)
            }
            ServiceError::ValidationFailure(msg) => ApiError::Validation(msg),
            ServiceError::Repository(err) => err.into(),
            ServiceError::Export(err) => {
                error!("Export failed: {}", err);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Constraint(msg) => ApiError::BadRequest(msg),
            other => {
                error!("Repository error: {}", other);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BusinessRule(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Rejected(status, msg) => (status, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportError;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_service_errors_map_to_status_codes() {
        assert_eq!(
            status_of(ServiceError::NotFound("User 1 not found".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::BusinessRuleViolation("User 1 is inactive".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ServiceError::ValidationFailure("bad".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ServiceError::Repository(RepositoryError::Constraint(
                "duplicate email".into()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::Repository(RepositoryError::Internal(
                "lock poisoned".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ServiceError::Export(ExportError::Io(std::io::Error::other(
                "disk full"
            )))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak_details() {
        let response =
            ApiError::from(RepositoryError::Internal("secret detail".into())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"error": "Internal server error"}));
    }
}
