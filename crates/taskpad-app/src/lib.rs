//! # taskpad-app
//!
//! Store adapters and view state for Taskpad. This crate translates UI
//! actions into document-store operations and maps live change
//! notifications back into view state:
//!
//! - **Session gate**: server-side session check in front of every
//!   protected page, with the identity provider behind a trait seam.
//! - **Task adapter**: live owner-scoped task list, create/delete, and the
//!   share-link action.
//! - **Comment adapter**: one-shot comment list for a task plus
//!   session-local create/delete.
//! - **Composers**: submission state machines for the two forms (validate
//!   on submit, busy while in flight, recoverable error state on remote
//!   failure).

pub mod clipboard;
pub mod comments;
pub mod session;
pub mod tasks;

mod error;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use comments::{CommentComposer, CommentThread};
pub use error::AppError;
pub use session::{protect, Gate, IdentityProvider, MemorySessions};
pub use tasks::{
    create_task, delete_task, list_tasks, load_public_task, share_link, share_task, TaskAccess,
    TaskComposer, TaskListView,
};

/// Collection holding task documents.
pub const TASKS_COLLECTION: &str = "tasks";
/// Collection holding comment documents.
pub const COMMENTS_COLLECTION: &str = "comments";
