//! Error types for Chronoview
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// Client-facing variants carry the exact message returned in the
/// `{"message": ...}` body. Server-side variants keep their detail
/// for logs and return a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    /// Username already registered (409)
    #[error("User already exists")]
    Conflict,

    /// Unknown user or wrong password (401)
    ///
    /// The two cases share one variant so responses cannot be used
    /// to enumerate usernames.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No Authorization header on a protected route (401)
    #[error("Token is missing")]
    MissingToken,

    /// Authorization header is not "<scheme> <token>" (401)
    #[error("Authorization header is malformed")]
    MalformedHeader,

    /// Token failed signature, expiry or decoding checks (401)
    #[error("Token is invalid or expired")]
    InvalidOrExpiredToken,

    /// Required request field missing (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document store error outside of SQL (500)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Status code and metric label for this error
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Conflict => (StatusCode::CONFLICT, "conflict"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token"),
            AppError::MalformedHeader => (StatusCode::UNAUTHORIZED, "malformed_header"),
            AppError::InvalidOrExpiredToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON `{"message": ...}` body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_type) = self.classify();
        let message = match &self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Database(_) => "Database error".to_string(),
            AppError::Store(_) | AppError::Config(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, error_type, "Request failed");
        }

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
