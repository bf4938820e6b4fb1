//! Declarative form schemas and their validation rules.
//!
//! Validation runs on submission only, before any store call. A failure is
//! field-scoped and carries a human-readable message; submission is
//! all-or-nothing per form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validation failure attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Message suitable for direct display next to the field.
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Submission state
// ---------------------------------------------------------------------------

/// State of an in-flight form submission.
///
/// While `InFlight`, the triggering control is disabled and shows a busy
/// label. `Failed` is recoverable: the form keeps its contents so the user
/// can retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    InFlight,
    Failed(String),
}

impl SubmitState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmitState::InFlight)
    }

    /// The remote failure message, if the last submission failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            SubmitState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Task form
// ---------------------------------------------------------------------------

/// New-task form: a body and an optional visibility flag (default false).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub text: String,
    pub is_public: bool,
}

impl TaskForm {
    pub fn new(text: impl Into<String>, is_public: bool) -> Self {
        Self {
            text: text.into(),
            is_public,
        }
    }

    /// Reject empty or whitespace-only bodies before anything touches the
    /// store.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.text.trim().is_empty() {
            return Err(FieldError {
                field: "task",
                message: "Enter a task.",
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Comment form
// ---------------------------------------------------------------------------

/// New-comment form: a single non-empty body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.text.trim().is_empty() {
            return Err(FieldError {
                field: "comment",
                message: "Enter a comment.",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_form_accepts_non_empty_body() {
        assert!(TaskForm::new("Buy milk", false).validate().is_ok());
    }

    #[test]
    fn task_form_rejects_empty_and_whitespace() {
        assert!(TaskForm::new("", false).validate().is_err());
        let err = TaskForm::new("   \n\t", true).validate().unwrap_err();
        assert_eq!(err.field, "task");
        assert_eq!(err.message, "Enter a task.");
    }

    #[test]
    fn comment_form_rejects_whitespace() {
        let err = CommentForm::new("  ").validate().unwrap_err();
        assert_eq!(err.field, "comment");
    }

    #[test]
    fn comment_form_accepts_body() {
        assert!(CommentForm::new("nice!").validate().is_ok());
    }
}
