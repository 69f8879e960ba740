//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("A customer with this national ID already exists")]
    DuplicateNationalId,

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Retriable system failures (5xx)
    #[error("Unit of work exceeded its deadline; the operation was rolled back")]
    LockTimeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<crate::domain::AmountError> for AppError {
    fn from(err: crate::domain::AmountError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::TransactionNotFound(id) => {
                (StatusCode::NOT_FOUND, "transaction_not_found", Some(id.clone()))
            }

            // 409 Conflict
            AppError::DuplicateNationalId => {
                (StatusCode::CONFLICT, "duplicate_national_id", None)
            }

            // Domain errors - business outcomes, mapped per kind
            AppError::Domain(ref domain_err) => {
                use crate::domain::DomainError;
                match domain_err {
                    DomainError::CustomerNotFound(key) => {
                        (StatusCode::NOT_FOUND, "customer_not_found", Some(key.clone()))
                    }
                    DomainError::CustomerNotVerified { .. } => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "customer_not_verified",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::TenorNotFound { .. } => (
                        StatusCode::NOT_FOUND,
                        "tenor_not_found",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::LimitNotSet => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "limit_not_set", None)
                    }
                    DomainError::InvalidLimitAmount(msg) => (
                        StatusCode::BAD_REQUEST,
                        "invalid_limit_amount",
                        Some(msg.clone()),
                    ),
                    DomainError::InsufficientLimit { .. } => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "insufficient_limit",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::VerificationConflict { .. } => (
                        StatusCode::CONFLICT,
                        "verification_conflict",
                        Some(domain_err.to_string()),
                    ),
                }
            }

            // 503 Service Unavailable - caller may retry
            AppError::LockTimeout => {
                tracing::warn!("Unit of work rolled back on deadline expiry");
                (StatusCode::SERVICE_UNAVAILABLE, "lock_timeout", None)
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
