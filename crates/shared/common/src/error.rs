//! Unified error handling for the HTTP API.
//!
//! Every error becomes the `{code, msg, data}` envelope with a non-zero code
//! and a matching HTTP status. Internal details are logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, QueryError};
use thiserror::Error;

use crate::response::{ApiResponse, Empty};

/// Client input failed DTO validation
pub const CODE_VALIDATION: i32 = 10001;
/// Query payload rejected by the query builder
pub const CODE_INVALID_QUERY: i32 = 10002;
pub const CODE_UNAUTHORIZED: i32 = 10003;
pub const CODE_FORBIDDEN: i32 = 10004;
pub const CODE_NOT_FOUND: i32 = 10005;
pub const CODE_CONFLICT: i32 = 10006;
/// Storage and other server-side failures
pub const CODE_INTERNAL: i32 = 10500;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    // External errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[cfg(feature = "jwt")]
    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Numeric code carried in the envelope
    pub fn code(&self) -> i32 {
        match self {
            AppError::Unauthorized => CODE_UNAUTHORIZED,
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => CODE_UNAUTHORIZED,
            AppError::Forbidden => CODE_FORBIDDEN,
            AppError::NotFound => CODE_NOT_FOUND,
            AppError::Conflict(_) => CODE_CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) => CODE_VALIDATION,
            AppError::InvalidQuery(_) => CODE_INVALID_QUERY,
            #[cfg(feature = "database")]
            AppError::Database(_) => CODE_INTERNAL,
            AppError::Internal(_) => CODE_INTERNAL,
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => format!("Invalid input: {}", msg),
            AppError::InvalidQuery(err) => err.to_string(),

            // Hide details for internal/security errors
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            #[cfg(feature = "jwt")]
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse {
            code: self.code(),
            msg: self.user_message(),
            data: Empty {},
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnknownPrimaryKey(_) => AppError::Internal(err.to_string()),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_query_error_envelope() {
        let (status, body) =
            body_of(AppError::from(QueryError::InvalidField("salary".to_string()))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"code": 10002, "msg": "field 'salary' is not queryable", "data": {}})
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = body_of(AppError::internal("connection refused at 10.0.0.3")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 10500);
        assert_eq!(body["msg"], "An internal error occurred");
    }

    #[test]
    fn test_codes_and_statuses() {
        let cases = [
            (AppError::Unauthorized, 10003, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, 10004, StatusCode::FORBIDDEN),
            (AppError::NotFound, 10005, StatusCode::NOT_FOUND),
            (AppError::conflict("Email"), 10006, StatusCode::CONFLICT),
            (AppError::validation("bad"), 10001, StatusCode::BAD_REQUEST),
            (AppError::bad_request("bad"), 10001, StatusCode::BAD_REQUEST),
        ];

        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status(), status);
        }
    }

    #[test]
    fn test_from_domain_error() {
        let err = AppError::from(DomainError::UnknownPrimaryKey("id".to_string()));
        assert!(matches!(&err, AppError::Internal(msg) if msg.contains("'id'")));
        assert_eq!(err.code(), 10500);
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u64> = None;
        assert!(matches!(missing.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
    }
}
