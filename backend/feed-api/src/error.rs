/// Error types for the feed API
///
/// Handlers return [`Result`] and propagate with `?`. The first error raised
/// carries its status; actix renders it once through [`ResponseError`].
/// Anything without a more specific status becomes a 500.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::validation::FieldViolation;

/// Result type for feed-api operations
pub type Result<T> = std::result::Result<T, AppError>;

pub const INVALID_INPUT_MESSAGE: &str = "validation failed, entered data is incorrect";
pub const EMAIL_TAKEN_MESSAGE: &str = "E-Mail address already exists!";

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Request input broke one or more rules
    #[error("{message}")]
    Validation {
        message: String,
        violations: Vec<FieldViolation>,
    },

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Caller does not own the resource
    #[error("{0}")]
    Forbidden(String),

    /// No caller identity on the request
    #[error("{0}")]
    Unauthorized(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Image file could not be written
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a [FieldViolation]>,
}

impl AppError {
    /// 422 with a message and no per-field detail
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            violations: Vec::new(),
        }
    }

    /// 422 for a set of field violations
    pub fn invalid_input(violations: Vec<FieldViolation>) -> Self {
        AppError::Validation {
            message: INVALID_INPUT_MESSAGE.to_string(),
            violations,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            AppError::Validation {
                message,
                violations,
            } => ErrorBody {
                message,
                data: Some(violations.as_slice()),
            },
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                ErrorBody {
                    message: "Internal server error",
                    data: None,
                }
            }
            AppError::NotFound(message)
            | AppError::Forbidden(message)
            | AppError::Unauthorized(message) => ErrorBody {
                message,
                data: None,
            },
        };

        HttpResponse::build(status).json(body)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail(_) => AppError::invalid_input(vec![
                FieldViolation::new("email", EMAIL_TAKEN_MESSAGE),
            ]),
            RepositoryError::MissingCreator(_) => AppError::NotFound("could not find user".into()),
            RepositoryError::Database(err) => AppError::Database(err.to_string()),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::Internal(err.to_string())
    }
}
