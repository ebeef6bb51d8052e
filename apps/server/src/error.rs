//! Unified API error handling.
//!
//! Every handler returns `ApiResult<T>`; failures become a JSON body
//! `{"code": "...", "message": "..."}` with the mapped HTTP status.
//! Domain and database errors convert up the chain
//! (`CoreError`/`ValidationError` → `DbError` → `ApiError`) so handlers
//! mostly just use `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use almacen_core::{CoreError, ValidationError};
use almacen_db::DbError;

pub type ApiResult<T> = Result<T, ApiError>;

/// API error enum.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // ---- Authentication (401) ----
    #[error("authentication required")]
    Unauthorized,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token")]
    InvalidToken,

    // ---- Authorization (403) ----
    #[error("permission denied: {0}")]
    Forbidden(String),

    // ---- Business outcomes (4xx) ----
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    #[error("sale {0} is already cancelled")]
    SaleAlreadyCancelled(String),

    // ---- System (5xx) ----
    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            ApiError::InsufficientStock { .. } => (StatusCode::CONFLICT, "INSUFFICIENT_STOCK"),
            ApiError::SaleAlreadyCancelled(_) => (StatusCode::CONFLICT, "SALE_ALREADY_CANCELLED"),
            ApiError::Database(msg) => {
                error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE")
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        };

        // 5xx details stay in the log, not in the response body.
        let message = match &self {
            ApiError::Database(_) => "database error".to_string(),
            ApiError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InsufficientStock {
                sku,
                available,
                requested,
            } => ApiError::InsufficientStock {
                sku,
                available,
                requested,
            },
            CoreError::SaleAlreadyCancelled { sale_id } => {
                ApiError::SaleAlreadyCancelled(sale_id)
            }
            CoreError::ProductNotFound(id) => ApiError::NotFound(format!("product {id}")),
            CoreError::SaleNotFound(id) => ApiError::NotFound(format!("sale {id}")),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { entity, id } => ApiError::NotFound(format!("{entity} {id}")),
            DbError::UniqueViolation { field, value } => {
                ApiError::Conflict(format!("duplicate value for {field}: {value}"))
            }
            DbError::ForeignKeyViolation { .. } => {
                ApiError::Validation("referenced record does not exist".to_string())
            }
            DbError::Domain(core) => ApiError::from(core),
            other => ApiError::Database(other.to_string()),
        }
    }
}
