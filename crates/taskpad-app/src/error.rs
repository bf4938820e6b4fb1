use thiserror::Error;

use taskpad_store::StoreError;

/// Errors produced by the adapter layer.
///
/// None of these are fatal: every variant is scoped to a single request or
/// a single view, and the composers turn remote failures into recoverable
/// on-screen state rather than swallowing them.
#[derive(Error, Debug)]
pub enum AppError {
    /// The document store rejected or failed an operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The identity provider failed to answer a session lookup.
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// A comment delete was attempted by someone other than its author.
    #[error("Only the comment author may delete it")]
    NotCommentAuthor,

    /// A referenced record does not exist.
    #[error("Record not found")]
    NotFound,

    /// The system clipboard could not be written.
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}
