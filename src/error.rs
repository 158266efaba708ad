//!
//! # Custom Error Handling
//!
//! This module defines the `AppError` type returned by every store, service and
//! handler in the application. Services raise coded errors and handlers pass them
//! through untouched; `AppError`'s `ResponseError` implementation is the single
//! place where HTTP status codes and JSON error bodies are decided.
//!
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors` and
//! `bcrypt::BcryptError` allow easy conversion with the `?` operator.

use std::fmt;

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{ValidationError, ValidationErrors};

/// A single violated input constraint, reported to the client in the `issues`
/// array of a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Location of the offending value. Empty for whole-body constraints.
    pub path: Vec<String>,
    /// Machine-readable constraint name, e.g. `length` or `email`.
    pub code: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: &[&str], code: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.iter().map(|segment| segment.to_string()).collect(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant maps to exactly one HTTP status code.
#[derive(Debug)]
pub enum AppError {
    /// The request body or path failed schema validation (HTTP 400).
    Validation(Vec<ValidationIssue>),
    /// The request body could not be parsed as JSON at all (HTTP 400).
    InvalidJson,
    /// A malformed request that is not a schema violation (HTTP 400).
    BadRequest(String),
    /// Missing, invalid or expired credentials (HTTP 401).
    Unauthorized(String),
    /// The resource does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// A uniqueness constraint would be violated (HTTP 409).
    Conflict(String),
    /// An unexpected server-side fault (HTTP 500).
    /// The detail is logged but never sent to the client.
    Internal(String),
}

impl AppError {
    pub fn validation(issue: ValidationIssue) -> Self {
        AppError::Validation(vec![issue])
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(issues) => {
                write!(f, "Validation Error: {} issue(s)", issues.len())
            }
            AppError::InvalidJson => write!(f, "Invalid JSON Payload"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidJson | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(issues) => json!({
                "message": "Validation Error",
                "issues": issues,
            }),
            AppError::InvalidJson => json!({ "message": "Invalid JSON Payload" }),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => json!({ "message": msg }),
            AppError::Internal(detail) => {
                log::error!("internal error: {}", detail);
                json!({ "message": "Internal Server Error" })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Unique and foreign-key violations are the storage layer's authoritative
/// guards, so they become `Conflict` and `NotFound` rather than 500s.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                let message = match db_error.constraint() {
                    Some("users_email_key") => "Email already in use",
                    Some("users_username_key") => "Username already in use",
                    _ => "Username or email already in use",
                };
                AppError::Conflict(message.into())
            }
            sqlx::Error::Database(ref db_error) if db_error.is_foreign_key_violation() => {
                AppError::NotFound("User not found".into())
            }
            _ => AppError::Internal(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// Produces one issue per violated constraint, ordered by field name so the
/// response is stable.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut issues: Vec<ValidationIssue> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| issue_from_validator(field, error))
            })
            .collect();
        issues.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.code.cmp(&b.code)));
        AppError::Validation(issues)
    }
}

fn issue_from_validator(field: &str, error: &ValidationError) -> ValidationIssue {
    // Struct-level checks are reported by validator under `__all__`.
    let path = if field == "__all__" {
        Vec::new()
    } else {
        vec![field.to_string()]
    };
    let message = match &error.message {
        Some(message) => message.to_string(),
        None => match (error.code.as_ref(), error.params.get("min")) {
            ("length", Some(min)) => format!("Must be at least {} characters long", min),
            ("email", _) => "Invalid email".to_string(),
            (code, _) => format!("Invalid value ({})", code),
        },
    };
    ValidationIssue {
        path,
        code: error.code.to_string(),
        message,
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("Password hashing failed: {}", error))
    }
}
