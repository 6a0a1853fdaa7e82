//! Error types for Biblion server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// RPC status codes exposed to clients in error payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCode {
    NotFound,
    AlreadyExists,
    Unauthenticated,
    PermissionDenied,
    FailedPrecondition,
    InvalidArgument,
    Internal,
}

impl RpcCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcCode::NotFound => "NOT_FOUND",
            RpcCode::AlreadyExists => "ALREADY_EXISTS",
            RpcCode::Unauthenticated => "UNAUTHENTICATED",
            RpcCode::PermissionDenied => "PERMISSION_DENIED",
            RpcCode::FailedPrecondition => "FAILED_PRECONDITION",
            RpcCode::InvalidArgument => "INVALID_ARGUMENT",
            RpcCode::Internal => "INTERNAL",
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No copies available: {0}")]
    OutOfStock(String),

    #[error("Loan limit exceeded: {0}")]
    LoanLimitExceeded(String),

    #[error("No active loan: {0}")]
    NoActiveLoan(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied")]
    AccessDenied,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Has dependent records: {0}")]
    HasDependentRecords(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // The repositories pre-check uniqueness, so these only fire on a race
        // between two concurrent writers.
        if let sqlx::Error::Database(ref db) = e {
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                return AppError::Duplicate("unique constraint violated".to_string());
            }
            if matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
                return AppError::HasDependentRecords(
                    "record is referenced by loan history".to_string(),
                );
            }
        }
        AppError::Database(e)
    }
}

/// Error response body: same shape as the mutation payload, success always false
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, RpcCode::NotFound, msg.clone()),
            AppError::OutOfStock(msg) => {
                (StatusCode::CONFLICT, RpcCode::FailedPrecondition, msg.clone())
            }
            AppError::LoanLimitExceeded(msg) => {
                (StatusCode::CONFLICT, RpcCode::FailedPrecondition, msg.clone())
            }
            AppError::NoActiveLoan(msg) => {
                (StatusCode::CONFLICT, RpcCode::FailedPrecondition, msg.clone())
            }
            AppError::Duplicate(msg) => {
                (StatusCode::CONFLICT, RpcCode::AlreadyExists, msg.clone())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                RpcCode::Unauthenticated,
                "Invalid username or password".to_string(),
            ),
            AppError::AccessDenied => (
                StatusCode::UNAUTHORIZED,
                RpcCode::Unauthenticated,
                "Access denied".to_string(),
            ),
            AppError::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, RpcCode::PermissionDenied, msg.clone())
            }
            AppError::HasDependentRecords(msg) => {
                (StatusCode::CONFLICT, RpcCode::FailedPrecondition, msg.clone())
            }
            AppError::InvariantViolation(msg) => {
                // A corrupted ledger is a bug, not a business rejection.
                tracing::error!("Ledger invariant violation: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RpcCode::Internal,
                    "Internal consistency error".to_string(),
                )
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, RpcCode::InvalidArgument, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RpcCode::Internal,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RpcCode::Internal,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            code: code.as_str().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
