// HTTP error type shared by every handler.
// Every error body is `{ "error": string }` plus an optional `details` payload.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::repositories::RepositoryError;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid ID format")]
    InvalidId,

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    /// Request understood but refused; `details` carries the reason data
    #[error("{message}")]
    Refused { message: String, details: Value },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn validation(details: Vec<String>) -> Self {
        ApiError::Validation {
            message: "Validation failed".to_string(),
            details,
        }
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Authentication required".to_string())
    }

    /// Get HTTP status code for error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId
            | ApiError::BadRequest(_)
            | ApiError::Validation { .. }
            | ApiError::Refused { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create error response body
    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            ApiError::Validation { details, .. } => Some(Value::from(details.clone())),
            ApiError::Refused { details, .. } => Some(details.clone()),
            _ => None,
        };

        ErrorResponse {
            error: self.to_string(),
            details,
        }
    }
}

// =============================================================================
// ERROR CONVERSIONS
// =============================================================================

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |e| format!("{}: {}", field, e.message.as_ref().unwrap_or(&e.code)))
            })
            .collect();
        // HashMap iteration order is unstable
        details.sort();

        ApiError::validation(details)
    }
}

// Extractor rejections keep the `{ "error": ... }` body shape
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            RepositoryError::Conflict(_) => {
                ApiError::Conflict("A record with the same unique value already exists".to_string())
            },
            RepositoryError::VersionConflict => ApiError::Conflict(
                "The resource was modified by another request. Reload and try again".to_string(),
            ),
            RepositoryError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref msg) = self {
            error!("Internal error: {}", msg);
        }

        let status = self.status_code();
        (status, Json(self.to_response())).into_response()
    }
}
