pub mod admin;
pub mod auth;
pub mod contact;
pub mod event;
pub mod health;
pub mod news;
pub mod newsletter;
pub mod resource;
pub mod story;
pub mod tag;
pub mod upload;
pub mod user;

use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};
use validator::ValidationError;

/// JSON body extractor whose rejections (malformed JSON, wrong field types)
/// surface as 400 `{error}` responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor with the same 400 `{error}` rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Validator for required text fields: whitespace alone does not count.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required"))
    } else {
        Ok(())
    }
}

/// Trim optional text, treating blank input as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim an optional patch value, keeping blanks so they clear the column.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
