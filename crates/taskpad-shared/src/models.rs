//! Domain model structs for tasks, comments and sessions.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be written
//! to / read from the document store and rendered straight into page or
//! event payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// UserSnapshot
// ---------------------------------------------------------------------------

/// Identity snapshot copied onto a record at creation time.
///
/// Intentionally denormalized: the snapshot is captured once and never
/// live-linked back to the provider, so it can go stale relative to the
/// user's current profile. That is accepted behavior, not a defect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSnapshot {
    /// Display name.
    pub name: String,
    /// Email address. Also used as the author-equality key for comment
    /// deletion.
    pub email: String,
    /// Avatar image URL.
    pub image: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An active identity-provider session.
///
/// Ephemeral and provider-owned; never persisted by this system. Serves
/// both as the authorization token for protected pages and as the source
/// of the snapshots written onto tasks and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user: UserSnapshot,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A single task.
///
/// Visible to its owner always; visible to anyone else only while
/// `is_public` is true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// Task body (non-empty).
    pub text: String,
    /// Whether non-owners may view the task and its comments.
    pub is_public: bool,
    /// Store-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Identity snapshot of the owner, captured at creation.
    pub owner: UserSnapshot,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment on a public task.
///
/// `task_id` references a task by identifier only; the store enforces no
/// referential integrity, so a comment can outlive its task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// Comment body (non-empty).
    pub text: String,
    /// Store-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// The task this comment belongs to.
    pub task_id: Uuid,
    /// Identity snapshot of the author, captured at comment time.
    pub author: UserSnapshot,
}
