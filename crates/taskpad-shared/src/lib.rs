//! # taskpad-shared
//!
//! Domain types shared by every Taskpad crate: the task and comment models,
//! the identity snapshot captured on each record, form schemas with their
//! validation rules, and the compact number formatter used by the landing
//! page.

pub mod format;
pub mod forms;
pub mod models;

pub use forms::{CommentForm, FieldError, SubmitState, TaskForm};
pub use models::{Comment, Session, Task, UserSnapshot};
