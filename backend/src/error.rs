//! Error handling for the Breastmilk Processing Operations Platform
//!
//! Provides consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// PostgreSQL codes for constraint violations that retrying will not fix
pub const CONSTRAINT_VIOLATION_CODES: &[&str] = &["23505", "23503", "23502", "22P02", "22001"];

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Tenant errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error on a single field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: format!("Invalid value for {}", field),
            field,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Friendly status and message for common PostgreSQL constraint errors
fn constraint_error(code: &str) -> Option<(StatusCode, &'static str, &'static str)> {
    match code {
        "23505" => Some((
            StatusCode::CONFLICT,
            "DUPLICATE_ENTRY",
            "This record already exists. Please check for duplicates.",
        )),
        "23503" => Some((
            StatusCode::CONFLICT,
            "RECORD_IN_USE",
            "Cannot delete this record because it's being used elsewhere.",
        )),
        "23502" => Some((
            StatusCode::BAD_REQUEST,
            "MISSING_REQUIRED_FIELD",
            "Required information is missing. Please fill in all required fields.",
        )),
        _ => None,
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message: message.clone(),
                    field: None,
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message: message.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::DatabaseError(sqlx::Error::Database(db_error)) => {
                match db_error.code().as_deref().and_then(constraint_error) {
                    Some((status, code, message)) => (
                        status,
                        ErrorDetail {
                            code: code.to_string(),
                            message: message.to_string(),
                            field: db_error.constraint().map(|c| c.to_string()),
                        },
                    ),
                    None => database_error_detail(),
                }
            }
            AppError::DatabaseError(_) => database_error_detail(),
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: message.clone(),
                    field: None,
                },
            ),
        }
    }
}

fn database_error_detail() -> (StatusCode, ErrorDetail) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorDetail {
            code: "DATABASE_ERROR".to_string(),
            message: "An error occurred while saving your data. Please try again.".to_string(),
            field: None,
        },
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
