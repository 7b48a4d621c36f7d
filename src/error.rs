//! Error types for validation, backend calls and command execution.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::fields::Status;

/// Shown when the backend gives no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Problems caught locally, before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,
    #[error("End date must be after the start date")]
    EndNotAfterStart,
    #[error("Select at least one department or user")]
    NoAssignee,
    #[error("A reason is required when setting a task to WAITING")]
    BlankWaitingReason,
    #[error("Cannot change status from {from:?} to {to:?}")]
    StatusNotOffered { from: Status, to: Status },
    #[error("Department {0} is not assigned to this task")]
    UnknownDepartment(u64),
    #[error("This task is not {0}")]
    WrongScope(&'static str),
    #[error("Recurrence interval must be at least 1")]
    InvalidRecurrenceInterval,
}

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} (HTTP {status})", self.user_message())]
pub struct ApiError {
    pub status: u16,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: Some(message.into()),
        }
    }

    pub fn not_found(what: impl fmt::Display) -> Self {
        ApiError::new(404, format!("{what} not found"))
    }

    /// Build from a response status and raw body, pulling the message out of
    /// a JSON `message` or `error` field when there is one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        ApiError { status, message }
    }

    /// Text to show in the error banner.
    pub fn user_message(&self) -> &str {
        self.message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// The target of a delete no longer exists.
    pub fn is_already_deleted(&self) -> bool {
        self.status == 404
            || self.status == 410
            || self
                .message
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains("already deleted"))
    }
}

/// Failure of a board transition.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Top-level error of a `tb` command.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid snapshot data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{}", join_validation(.0))]
    InvalidForm(Vec<ValidationError>),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Not logged in. Run `tb login <user-id>` first")]
    NotLoggedIn,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Bad input: {0}")]
    BadInput(String),
}

impl From<BoardError> for AppError {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::Validation(v) => AppError::Validation(v),
            BoardError::Api(a) => AppError::Api(a),
        }
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_extracted_from_body() {
        let e = ApiError::from_response(400, r#"{"message": "Title already used"}"#);
        assert_eq!(e.user_message(), "Title already used");

        let e = ApiError::from_response(500, r#"{"error": "boom"}"#);
        assert_eq!(e.user_message(), "boom");
    }

    #[test]
    fn test_fallback_message() {
        let e = ApiError::from_response(502, "<html>Bad gateway</html>");
        assert_eq!(e.message, None);
        assert_eq!(e.user_message(), GENERIC_ERROR_MESSAGE);

        let e = ApiError::from_response(500, r#"{"message": "  "}"#);
        assert_eq!(e.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_display_includes_status() {
        assert_eq!(ApiError::new(409, "Stale task").to_string(), "Stale task (HTTP 409)");
        assert_eq!(
            ApiError::from_response(500, "").to_string(),
            format!("{GENERIC_ERROR_MESSAGE} (HTTP 500)")
        );
    }

    #[test]
    fn test_already_deleted_detection() {
        assert!(ApiError::from_response(404, "").is_already_deleted());
        assert!(ApiError::new(400, "Attachment already deleted").is_already_deleted());
        assert!(!ApiError::new(500, "Disk full").is_already_deleted());
    }

    #[test]
    fn test_form_errors_join() {
        let e = AppError::InvalidForm(vec![ValidationError::EmptyTitle, ValidationError::NoAssignee]);
        assert_eq!(
            e.to_string(),
            "Title must not be empty; Select at least one department or user"
        );
    }
}
