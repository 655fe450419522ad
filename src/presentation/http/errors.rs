//! HTTP error handling and response conversion.
//!
//! Domain failures are mapped to status codes and a JSON body of the form
//! `{"error": <user-safe message>, "code": <stable machine code>}`. Storage
//! details are logged, never returned.

use crate::domain::shared::errors::DomainError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Application-level errors returned from handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404).
    NotFound(String),

    /// Malformed request (400).
    BadRequest(String),

    /// Requested vote state outside UPVOTE/DOWNVOTE (400).
    InvalidVoteState(String),

    /// Access denied - authentication required (403).
    Forbidden(String),

    /// Request data failed validation (400).
    ValidationError(String),

    /// A concurrent write won and retries were exhausted (409).
    Conflict(String),

    /// Storage could not complete the unit of work; safe to retry (503).
    StorageUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::InvalidVoteState(value) => write!(f, "Invalid vote state: {}", value),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
        }
    }
}

impl AppError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::InvalidVoteState(_) | Self::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "UNEXPECTED_BODY",
            Self::InvalidVoteState(_) => "UNKNOWN_VOTE_STATE",
            Self::Forbidden(_) => "UNAUTHORIZED",
            Self::ValidationError(_) => "VALIDATION_FAILED",
            Self::Conflict(_) => "VOTE_CONFLICT",
            Self::StorageUnavailable(_) => "SERVER_ERROR",
        }
    }

    /// Get a user-safe error message (without implementation details).
    fn user_message(&self) -> String {
        match self {
            Self::NotFound(msg) => msg.clone(),
            Self::BadRequest(msg) => msg.clone(),
            Self::InvalidVoteState(_) => "Vote state must be UPVOTE or DOWNVOTE".into(),
            Self::Forbidden(_) => "Access denied".into(),
            Self::ValidationError(msg) => msg.clone(),
            Self::Conflict(_) => "Vote changed concurrently, please retry".into(),
            Self::StorageUnavailable(_) => "Service temporarily unavailable".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match status {
            StatusCode::SERVICE_UNAVAILABLE => {
                tracing::error!("error={}", self);
            }
            StatusCode::CONFLICT => {
                tracing::warn!("error={}", self);
            }
            _ => {
                tracing::debug!("error={}", self);
            }
        }

        let body = json!({ "error": self.user_message(), "code": self.code() });
        (status, Json(body)).into_response()
    }
}

// === Domain Error Conversion ===

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => AppError::NotFound(msg),
            DomainError::ValidationError(msg) => AppError::ValidationError(msg),
            DomainError::InvalidVoteState(value) => AppError::InvalidVoteState(value),
            DomainError::StorageConflict(msg) => AppError::Conflict(msg),
            DomainError::StorageUnavailable(msg) => AppError::StorageUnavailable(msg),
            DomainError::Unauthorized => AppError::Forbidden("Unauthorized".into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
