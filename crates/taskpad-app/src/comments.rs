//! Comment store adapter, scoped to a single task's comments.
//!
//! The detail page fetches its comments once (no live query); comments
//! added within the rendered session are appended to local state in
//! creation order. Deletion is author-only, and the check is enforced here
//! at the store boundary — against the *stored* author email, not just the
//! rendering layer's affordance.

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use taskpad_shared::{Comment, CommentForm, Session, SubmitState, UserSnapshot};
use taskpad_store::{Collection, Document, Query, Store};

use crate::error::AppError;
use crate::COMMENTS_COLLECTION;

/// Wire shape of a comment document's fields.
#[derive(Debug, Deserialize)]
struct CommentFields {
    comment: String,
    #[serde(rename = "taskId")]
    task_id: Uuid,
    user: UserSnapshot,
}

fn comment_from_document(doc: &Document) -> Result<Comment, AppError> {
    let fields: CommentFields = doc.fields_as()?;
    Ok(Comment {
        id: doc.id,
        text: fields.comment,
        created_at: doc.created_at,
        task_id: fields.task_id,
        author: fields.user,
    })
}

// ---------------------------------------------------------------------------
// Comment thread
// ---------------------------------------------------------------------------

/// The comment list for one task plus the operations on it.
pub struct CommentThread {
    coll: Collection,
    task_id: Uuid,
    comments: Vec<Comment>,
}

impl CommentThread {
    /// One-shot fetch of every comment whose `taskId` matches. No ordering
    /// is imposed: display order is fetch order.
    pub async fn load(store: &Store, task_id: Uuid) -> Result<Self, AppError> {
        let coll = store.collection(COMMENTS_COLLECTION);
        let query = Query::new().where_eq("taskId", json!(task_id));
        let docs = coll.get_all(&query).await?;

        let comments = docs
            .iter()
            .filter_map(|doc| match comment_from_document(doc) {
                Ok(comment) => Some(comment),
                Err(err) => {
                    tracing::warn!(id = %doc.id, error = %err, "skipping malformed comment document");
                    None
                }
            })
            .collect();

        Ok(Self {
            coll,
            task_id,
            comments,
        })
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Create a comment. Two round trips by design: the record is added,
    /// then re-fetched by identifier so the entry appended locally carries
    /// the server-resolved timestamp. A failure between the two steps
    /// leaves the remote record without a local entry until a full reload.
    pub async fn add(&mut self, author: &UserSnapshot, text: &str) -> Result<Uuid, AppError> {
        let added = self
            .coll
            .add(json!({
                "comment": text,
                "taskId": self.task_id,
                "user": author,
            }))
            .await?;

        let doc = self.coll.get(added.id).await?.ok_or(AppError::NotFound)?;
        let comment = comment_from_document(&doc)?;
        self.comments.push(comment);
        Ok(added.id)
    }

    /// Delete a comment, returning the removed record. Permitted only when
    /// the acting session's email equals the stored author email; anyone
    /// else gets [`AppError::NotCommentAuthor`] and nothing changes.
    pub async fn delete(&mut self, session: &Session, id: Uuid) -> Result<Comment, AppError> {
        let doc = self.coll.get(id).await?.ok_or(AppError::NotFound)?;
        let comment = comment_from_document(&doc)?;
        if comment.author.email != session.user.email {
            return Err(AppError::NotCommentAuthor);
        }

        self.coll.delete(id).await?;
        self.comments.retain(|c| c.id != id);
        Ok(comment)
    }

    /// Whether the delete affordance is shown for a comment.
    pub fn can_delete(session: Option<&Session>, comment: &Comment) -> bool {
        session
            .map(|s| s.user.email == comment.author.email)
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Comment composer
// ---------------------------------------------------------------------------

/// Submission state machine for the new-comment form.
///
/// The control is disabled without an active session and while a
/// submission is in flight. Remote failures keep the text and surface the
/// error for retry.
#[derive(Debug, Default)]
pub struct CommentComposer {
    pub text: String,
    state: SubmitState,
    field_error: Option<taskpad_shared::FieldError>,
}

impl CommentComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_in_flight()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_busy() {
            "Sending comment..."
        } else {
            "Send comment"
        }
    }

    pub fn field_error(&self) -> Option<&taskpad_shared::FieldError> {
        self.field_error.as_ref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Submit the form against a thread. `None` without a session, while
    /// busy, on validation failure, or on a remote failure (text kept).
    pub async fn submit(
        &mut self,
        thread: &mut CommentThread,
        session: Option<&Session>,
    ) -> Option<Uuid> {
        let Some(session) = session else {
            return None;
        };
        if self.is_busy() {
            return None;
        }
        self.field_error = None;

        let form = CommentForm::new(self.text.clone());
        if let Err(err) = form.validate() {
            self.field_error = Some(err);
            return None;
        }

        self.state = SubmitState::InFlight;
        match thread.add(&session.user, &form.text).await {
            Ok(id) => {
                self.text.clear();
                self.state = SubmitState::Idle;
                Some(id)
            }
            Err(err) => {
                tracing::error!(error = %err, "comment creation failed");
                self.state = SubmitState::Failed(err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(name: &str, email: &str) -> UserSnapshot {
        UserSnapshot {
            name: name.into(),
            email: email.into(),
            image: String::new(),
        }
    }

    fn session_for(name: &str, email: &str) -> Session {
        Session {
            user: snapshot(name, email),
        }
    }

    #[tokio::test]
    async fn load_returns_exactly_the_tasks_comments() {
        let store = Store::new();
        let this_task = Uuid::new_v4();
        let other_task = Uuid::new_v4();

        let mut thread = CommentThread::load(&store, this_task).await.unwrap();
        thread.add(&snapshot("Bea", "bea@example.com"), "on this task")
            .await
            .unwrap();
        let mut other = CommentThread::load(&store, other_task).await.unwrap();
        other
            .add(&snapshot("Bea", "bea@example.com"), "elsewhere")
            .await
            .unwrap();

        let reloaded = CommentThread::load(&store, this_task).await.unwrap();
        assert_eq!(reloaded.comments().len(), 1);
        assert_eq!(reloaded.comments()[0].text, "on this task");
        assert_eq!(reloaded.comments()[0].task_id, this_task);
    }

    #[tokio::test]
    async fn add_appends_with_the_server_resolved_timestamp() {
        let store = Store::new();
        let task_id = Uuid::new_v4();
        let mut thread = CommentThread::load(&store, task_id).await.unwrap();

        let id = thread
            .add(&snapshot("Bea", "bea@example.com"), "nice!")
            .await
            .unwrap();

        assert_eq!(thread.comments().len(), 1);
        let local = &thread.comments()[0];
        let stored = store
            .collection(COMMENTS_COLLECTION)
            .get(id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(local.created_at, stored.created_at);
        assert_eq!(local.author.name, "Bea");
    }

    #[tokio::test]
    async fn local_appends_keep_creation_order() {
        let store = Store::new();
        let task_id = Uuid::new_v4();
        let mut thread = CommentThread::load(&store, task_id).await.unwrap();
        let bea = snapshot("Bea", "bea@example.com");

        thread.add(&bea, "first").await.unwrap();
        thread.add(&bea, "second").await.unwrap();

        let bodies: Vec<_> = thread.comments().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(bodies, ["first", "second"]);
    }

    #[tokio::test]
    async fn only_the_author_may_delete() {
        let store = Store::new();
        let task_id = Uuid::new_v4();
        let mut thread = CommentThread::load(&store, task_id).await.unwrap();
        let id = thread
            .add(&snapshot("Bea", "bea@example.com"), "nice!")
            .await
            .unwrap();

        let carol = session_for("Carol", "carol@example.com");
        let err = thread.delete(&carol, id).await.unwrap_err();
        assert!(matches!(err, AppError::NotCommentAuthor));
        assert_eq!(thread.comments().len(), 1);

        let bea = session_for("Bea", "bea@example.com");
        let removed = thread.delete(&bea, id).await.unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(removed.task_id, task_id);
        assert!(thread.comments().is_empty());
        assert_eq!(
            store.collection(COMMENTS_COLLECTION).count().await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn delete_affordance_follows_the_author_email() {
        let comment = Comment {
            id: Uuid::new_v4(),
            text: "nice!".into(),
            created_at: chrono::Utc::now(),
            task_id: Uuid::new_v4(),
            author: snapshot("Bea", "bea@example.com"),
        };

        let bea = session_for("Bea", "bea@example.com");
        let carol = session_for("Carol", "carol@example.com");
        assert!(CommentThread::can_delete(Some(&bea), &comment));
        assert!(!CommentThread::can_delete(Some(&carol), &comment));
        assert!(!CommentThread::can_delete(None, &comment));
    }

    #[tokio::test]
    async fn composer_requires_a_session() {
        let store = Store::new();
        let mut thread = CommentThread::load(&store, Uuid::new_v4()).await.unwrap();

        let mut composer = CommentComposer::new();
        composer.text = "nice!".into();
        assert_eq!(composer.submit(&mut thread, None).await, None);
        assert_eq!(
            store.collection(COMMENTS_COLLECTION).count().await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn composer_validates_before_the_store_sees_anything() {
        let store = Store::new();
        let mut thread = CommentThread::load(&store, Uuid::new_v4()).await.unwrap();
        let bea = session_for("Bea", "bea@example.com");

        let mut composer = CommentComposer::new();
        composer.text = "  \n".into();
        assert_eq!(composer.submit(&mut thread, Some(&bea)).await, None);
        assert_eq!(composer.field_error().unwrap().message, "Enter a comment.");
        assert!(thread.comments().is_empty());
    }

    #[tokio::test]
    async fn composer_clears_on_success() {
        let store = Store::new();
        let mut thread = CommentThread::load(&store, Uuid::new_v4()).await.unwrap();
        let bea = session_for("Bea", "bea@example.com");

        let mut composer = CommentComposer::new();
        composer.text = "nice!".into();
        let id = composer.submit(&mut thread, Some(&bea)).await;

        assert!(id.is_some());
        assert!(composer.text.is_empty());
        assert_eq!(thread.comments().len(), 1);
        assert_eq!(thread.comments()[0].text, "nice!");
    }
}
