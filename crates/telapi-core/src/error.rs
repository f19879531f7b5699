//! Unified error handling for TelAPI
//!
//! This module provides a single error type covering all failure scenarios
//! in the application, with automatic HTTP response mapping for the API layer.
//!
//! A conditional state transition that matches zero rows is NOT an error:
//! repositories report it as `Ok(false)` and callers skip the record.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Job Errors ====================
    /// The dispatched workflow name is not in the registry. Fatal: this is a
    /// registration/deployment bug, never retried.
    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),

    /// One or more records in a workflow batch failed to transition. The
    /// batch is never aborted; already-applied transitions are preserved.
    #[error("Workflow failed: {0}")]
    Workflow(String),

    #[error("Job queue error: {0}")]
    Queue(String),

    // ==================== Resource Errors ====================
    #[error("Call not found: {0}")]
    CallNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::CallNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::UnknownWorkflow(_) => "unknown_workflow",
            AppError::Workflow(_) => "workflow_error",
            AppError::Queue(_) => "queue_error",
            AppError::CallNotFound(_) => "call_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether a failed job carrying this error may be retried by the job
    /// infrastructure. `UnknownWorkflow` indicates a deployment bug and must
    /// surface to operators instead of being retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AppError::UnknownWorkflow(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::CallNotFound("CA123".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("To is required".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnknownWorkflow("NoSuchWorkflow".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::UnknownWorkflow("NoSuchWorkflow".to_string()).error_code(),
            "unknown_workflow"
        );
        assert_eq!(
            AppError::Workflow("2 of 5 transitions failed".to_string()).error_code(),
            "workflow_error"
        );
    }

    #[test]
    fn test_unknown_workflow_is_not_retryable() {
        assert!(!AppError::UnknownWorkflow("Bogus".to_string()).is_retryable());
        assert!(AppError::Database("connection reset".to_string()).is_retryable());
        assert!(AppError::Workflow("1 of 3 transitions failed".to_string()).is_retryable());
    }
}
