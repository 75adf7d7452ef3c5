//! Boundary checks shared by the request handlers and the chatbot.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Deliberately loose: something, an `@`, something, a dot, something.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Returns the trimmed value, or a 400 naming the field when it is absent or blank.
pub fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{field} is required"))),
    }
}

pub fn email(field: &str, value: Option<String>) -> Result<String, AppError> {
    let value = required(field, value)?;
    if !is_valid_email(&value) {
        return Err(AppError::BadRequest(format!("{field} is not a valid email address")));
    }
    Ok(value.to_lowercase())
}

/// Blank optional text collapses to `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
