//! Request-shape checks shared by the handlers: path ids, password strength and
//! translation of JSON extractor failures into `AppError`.

use actix_web::{error::JsonPayloadError, web, HttpRequest};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::error::Category;
use validator::ValidationError;

use crate::error::{AppError, ValidationIssue};

lazy_static! {
    static ref NUMERIC_ID: Regex = Regex::new(r"^\d+$").unwrap();
}

/// Parses a numeric path segment into an entity id.
pub fn parse_id(raw: &str) -> Result<i32, AppError> {
    let invalid = || {
        AppError::validation(ValidationIssue::new(
            &["id"],
            "invalid_id",
            "ID must be a number",
        ))
    };
    if !NUMERIC_ID.is_match(raw) {
        return Err(invalid());
    }
    raw.parse::<i32>().map_err(|_| invalid())
}

/// Requires at least one uppercase letter, one lowercase letter, one digit and
/// one ASCII punctuation or symbol character. Length is checked separately.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| c.is_ascii_punctuation());

    if has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_strength");
        error.message = Some(
            "Password must contain an uppercase letter, a lowercase letter, a digit and a symbol"
                .into(),
        );
        Err(error)
    }
}

/// Maps JSON extractor failures: unparseable bodies become `InvalidJson`,
/// well-formed bodies of the wrong shape become validation errors.
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let app_error = match error {
        JsonPayloadError::Deserialize(ref source) if source.classify() == Category::Data => {
            AppError::validation(data_error_issue(source))
        }
        JsonPayloadError::Deserialize(_) | JsonPayloadError::ContentType => AppError::InvalidJson,
        other => AppError::BadRequest(other.to_string()),
    };
    log::debug!("rejected request body: {}", app_error);
    app_error.into()
}

/// Builds the issue for a body that parsed but has the wrong shape. serde names
/// the offending key for unknown and missing fields; type mismatches only carry
/// a position, so their path stays empty.
fn data_error_issue(error: &serde_json::Error) -> ValidationIssue {
    let message = error.to_string();
    for (prefix, code) in [
        ("unknown field `", "unrecognized_keys"),
        ("missing field `", "required"),
    ] {
        if let Some(field) = message
            .strip_prefix(prefix)
            .and_then(|rest| rest.split('`').next())
        {
            return ValidationIssue::new(&[field], code, message.as_str());
        }
    }
    ValidationIssue::new(&[], "invalid_type", message)
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}
