use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cozystay_booking::{BookingError, CancellationError, Rejection};
use cozystay_core::RepoError;
use serde_json::json;

use crate::session::SessionError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    Rejected(Rejection),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Timeout,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, reason, message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, "unauthenticated", msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "validation_failed", msg),
            AppError::Rejected(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.reason(), rejection.to_string())
            }
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, "conflict", msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal server error".to_string())
            }
            AppError::Timeout => (StatusCode::REQUEST_TIMEOUT, "timeout", "Request timed out".to_string()),
        };

        let body = Json(json!({
            "error": reason,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFoundError(msg),
            RepoError::Conflict(msg) => AppError::ConflictError(msg),
            RepoError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            BookingError::NotFound(msg) => AppError::NotFoundError(msg),
            BookingError::Conflict(msg) => AppError::ConflictError(msg),
            BookingError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<CancellationError> for AppError {
    fn from(err: CancellationError) -> Self {
        match err {
            CancellationError::NotFound => AppError::NotFoundError("Booking not found".to_string()),
            CancellationError::Forbidden => AppError::AuthorizationError("forbidden access".to_string()),
            CancellationError::Rejected(rejection) => AppError::Rejected(rejection),
            CancellationError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        tracing::debug!("session rejected: {}", err);
        match err {
            SessionError::Missing => AppError::AuthenticationError("not authorized".to_string()),
            SessionError::Invalid(_) => AppError::AuthenticationError("unauthorized".to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
