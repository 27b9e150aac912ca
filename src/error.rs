//! Application error types and result alias.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Backing store unreachable or connection pool exhausted.
    /// Retryable by the caller; never reported as an empty result.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Authentication error (malformed credential on a path that requires one)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The record exists but the caller does not own it
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// No such record, or the record is soft-deleted
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Integrity conflict (e.g. id collision on create)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream collaborator failure (plan generation, image lookup)
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Address parse error
    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JWT error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // Pool exhaustion and transport failures are a distinct, retryable
        // category; everything else is a plain database error.
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                AppError::StoreUnavailable(e.to_string())
            }
            sqlx::Error::Io(_) => AppError::StoreUnavailable(e.to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Config(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database operation failed".to_string(),
            ),
            AppError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Storage backend is temporarily unavailable".to_string(),
            ),
            AppError::Migration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MIGRATION_ERROR",
                "Database migration failed".to_string(),
            ),
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone()),
            AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                "IO operation failed".to_string(),
            ),
            AppError::AddrParse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ADDR_PARSE_ERROR",
                "Invalid address".to_string(),
            ),
            AppError::Json(_) => (
                StatusCode::BAD_REQUEST,
                "JSON_ERROR",
                "Invalid JSON".to_string(),
            ),
            AppError::Jwt(_) => (
                StatusCode::UNAUTHORIZED,
                "JWT_ERROR",
                "Invalid token".to_string(),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        // Log the error
        tracing::error!(error = %self, code = code, "Request error");

        let body = Json(json!({
            "code": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(AppError::Validation("bad limit".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::NotFound("no such trip".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_forbidden_maps_to_403_distinct_from_404() {
        let forbidden = status_of(AppError::Forbidden("not yours".into()));
        let not_found = status_of(AppError::NotFound("gone".into()));
        assert_eq!(forbidden, StatusCode::FORBIDDEN);
        assert_ne!(forbidden, not_found);
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        assert_eq!(
            status_of(AppError::StoreUnavailable("pool exhausted".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_conflict_maps_to_409() {
        assert_eq!(
            status_of(AppError::Conflict("duplicate id".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_pool_timeout_classified_as_store_unavailable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[test]
    fn test_pool_closed_classified_as_store_unavailable() {
        let err = AppError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[test]
    fn test_row_not_found_is_plain_database_error() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
