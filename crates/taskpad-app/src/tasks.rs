//! Task store adapter: the live owner-scoped task list, task creation and
//! deletion, the share action, and the public-detail access check.

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use taskpad_shared::{SubmitState, Task, TaskForm, UserSnapshot};
use taskpad_store::{Collection, Direction, Document, Query, Store, Subscription, CREATED_AT};

use crate::clipboard::Clipboard;
use crate::error::AppError;
use crate::TASKS_COLLECTION;

/// Wire shape of a task document's fields.
#[derive(Debug, Deserialize)]
struct TaskFields {
    task: String,
    #[serde(rename = "isPublic", default)]
    is_public: bool,
    user: UserSnapshot,
}

fn task_from_document(doc: &Document) -> Result<Task, AppError> {
    let fields: TaskFields = doc.fields_as()?;
    Ok(Task {
        id: doc.id,
        text: fields.task,
        is_public: fields.is_public,
        created_at: doc.created_at,
        owner: fields.user,
    })
}

/// Map a snapshot to tasks. The store is schemaless, so a document that
/// does not parse is skipped with a warning rather than poisoning the view.
fn map_tasks(docs: &[Document]) -> Vec<Task> {
    docs.iter()
        .filter_map(|doc| match task_from_document(doc) {
            Ok(task) => Some(task),
            Err(err) => {
                tracing::warn!(id = %doc.id, error = %err, "skipping malformed task document");
                None
            }
        })
        .collect()
}

/// Standing dashboard query: the current user's tasks, newest first.
fn owner_query(identity: &UserSnapshot) -> Result<Query, AppError> {
    let snapshot = serde_json::to_value(identity).map_err(taskpad_store::StoreError::Serde)?;
    Ok(Query::new()
        .where_eq("user", snapshot)
        .order_by(CREATED_AT, Direction::Desc))
}

// ---------------------------------------------------------------------------
// Live task list
// ---------------------------------------------------------------------------

/// Live view over the signed-in user's tasks.
///
/// Holds the subscription handle for exactly as long as the view exists;
/// [`close`](Self::close) (or drop) releases it. Every delivered snapshot
/// replaces the local list atomically — there are no diffs.
pub struct TaskListView {
    coll: Collection,
    identity: UserSnapshot,
    tasks: Vec<Task>,
    sub: Subscription,
}

impl TaskListView {
    /// Open the view: subscribe and apply the initial snapshot.
    pub async fn open(store: &Store, identity: UserSnapshot) -> Result<Self, AppError> {
        let coll = store.collection(TASKS_COLLECTION);
        let mut sub = coll.subscribe(owner_query(&identity)?);
        let tasks = map_tasks(&sub.next().await.unwrap_or_default());
        Ok(Self {
            coll,
            identity,
            tasks,
            sub,
        })
    }

    /// The most recently delivered result set.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn identity(&self) -> &UserSnapshot {
        &self.identity
    }

    /// Wait for the next change notification and replace local state with
    /// the delivered result set. Returns `false` once the subscription has
    /// been released.
    pub async fn next_change(&mut self) -> bool {
        match self.sub.next().await {
            Some(docs) => {
                self.tasks = map_tasks(&docs);
                true
            }
            None => false,
        }
    }

    /// Switch the filtering identity: release the old subscription and
    /// open a fresh one for the new snapshot.
    pub async fn set_identity(&mut self, identity: UserSnapshot) -> Result<(), AppError> {
        self.sub.unsubscribe();
        let mut sub = self.coll.subscribe(owner_query(&identity)?);
        self.tasks = map_tasks(&sub.next().await.unwrap_or_default());
        self.identity = identity;
        self.sub = sub;
        Ok(())
    }

    /// Tear the view down, releasing the subscription deterministically.
    pub fn close(mut self) {
        self.sub.unsubscribe();
    }
}

/// One-shot read of the owner's tasks, newest first. The server-rendered
/// dashboard uses this for the initial page; the live feed uses
/// [`TaskListView`].
pub async fn list_tasks(store: &Store, identity: &UserSnapshot) -> Result<Vec<Task>, AppError> {
    let docs = store
        .collection(TASKS_COLLECTION)
        .get_all(&owner_query(identity)?)
        .await?;
    Ok(map_tasks(&docs))
}

// ---------------------------------------------------------------------------
// Create / delete / share
// ---------------------------------------------------------------------------

/// Append a new task with the owner's identity snapshot. The store assigns
/// identifier and timestamp. Validation is the composer's job; this is the
/// raw store operation.
pub async fn create_task(
    tasks: &Collection,
    owner: &UserSnapshot,
    form: &TaskForm,
) -> Result<Uuid, AppError> {
    let doc = tasks
        .add(json!({
            "task": form.text,
            "isPublic": form.is_public,
            "user": owner,
        }))
        .await?;
    Ok(doc.id)
}

/// Remove a task by identifier. Unconditional and irreversible — the
/// action is only ever offered inside the owner's own live list.
pub async fn delete_task(tasks: &Collection, id: Uuid) -> Result<(), AppError> {
    tasks.delete(id).await?;
    Ok(())
}

/// Shareable absolute link for a public task. A missing public origin
/// yields a malformed (origin-less) link, not an error.
pub fn share_link(public_url: Option<&str>, id: Uuid) -> String {
    let origin = public_url.unwrap_or_default().trim_end_matches('/');
    format!("{origin}/task/{id}")
}

/// Compute the share link and place it on the clipboard. Pure side effect;
/// no store interaction.
pub fn share_task(
    clipboard: &mut dyn Clipboard,
    public_url: Option<&str>,
    id: Uuid,
) -> Result<String, AppError> {
    let link = share_link(public_url, id);
    clipboard.write_text(&link)?;
    Ok(link)
}

// ---------------------------------------------------------------------------
// Public detail access
// ---------------------------------------------------------------------------

/// Outcome of resolving a task for its public detail page.
#[derive(Debug)]
pub enum TaskAccess {
    /// Not found or not public — indistinguishable to the requester by
    /// design; redirect to the landing page.
    Redirect,
    /// Public task, ready to render.
    Granted(Task),
}

/// Resolve a task for `/task/{id}`. Requires no session: the identifier
/// itself grants read access once the task is public.
pub async fn load_public_task(store: &Store, id: Uuid) -> Result<TaskAccess, AppError> {
    let Some(doc) = store.collection(TASKS_COLLECTION).get(id).await? else {
        return Ok(TaskAccess::Redirect);
    };
    let task = task_from_document(&doc)?;
    if !task.is_public {
        return Ok(TaskAccess::Redirect);
    }
    Ok(TaskAccess::Granted(task))
}

// ---------------------------------------------------------------------------
// Task composer
// ---------------------------------------------------------------------------

/// Submission state machine for the new-task form.
///
/// Validates on submit only. While a submission is in flight the control
/// is disabled (`submit` is a no-op) and shows a busy label. A remote
/// failure keeps the form contents and exposes the error so the user can
/// retry; a success clears the form.
#[derive(Debug, Default)]
pub struct TaskComposer {
    pub text: String,
    pub is_public: bool,
    state: SubmitState,
    field_error: Option<taskpad_shared::FieldError>,
}

impl TaskComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_in_flight()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_busy() {
            "Saving..."
        } else {
            "Save"
        }
    }

    /// Field-scoped validation error from the last submission attempt.
    pub fn field_error(&self) -> Option<&taskpad_shared::FieldError> {
        self.field_error.as_ref()
    }

    /// Remote failure from the last submission attempt, if any.
    pub fn submit_error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Submit the form. Returns the new task id on success; `None` when
    /// validation failed, the control was busy, or the store rejected the
    /// create (in which case the form keeps its contents for retry).
    pub async fn submit(
        &mut self,
        tasks: &Collection,
        owner: &UserSnapshot,
    ) -> Option<Uuid> {
        if self.is_busy() {
            return None;
        }
        self.field_error = None;

        let form = TaskForm::new(self.text.clone(), self.is_public);
        if let Err(err) = form.validate() {
            self.field_error = Some(err);
            return None;
        }

        self.state = SubmitState::InFlight;
        match create_task(tasks, owner, &form).await {
            Ok(id) => {
                self.text.clear();
                self.is_public = false;
                self.state = SubmitState::Idle;
                Some(id)
            }
            Err(err) => {
                tracing::error!(error = %err, "task creation failed");
                self.state = SubmitState::Failed(err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryClipboard;

    fn ana() -> UserSnapshot {
        UserSnapshot {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            image: "https://example.com/ana.png".into(),
        }
    }

    fn bea() -> UserSnapshot {
        UserSnapshot {
            name: "Bea".into(),
            email: "bea@example.com".into(),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn created_task_appears_in_the_live_list() {
        let store = Store::new();
        let tasks = store.collection(TASKS_COLLECTION);
        let mut view = TaskListView::open(&store, ana()).await.unwrap();
        assert!(view.tasks().is_empty());

        create_task(&tasks, &ana(), &TaskForm::new("Buy milk", false))
            .await
            .unwrap();
        assert!(view.next_change().await);

        assert_eq!(view.tasks().len(), 1);
        assert_eq!(view.tasks()[0].text, "Buy milk");
        assert!(!view.tasks()[0].is_public);
    }

    #[tokio::test]
    async fn visibility_flag_matches_the_checkbox_state() {
        let store = Store::new();
        let tasks = store.collection(TASKS_COLLECTION);
        let mut view = TaskListView::open(&store, ana()).await.unwrap();

        create_task(&tasks, &ana(), &TaskForm::new("public one", true))
            .await
            .unwrap();
        view.next_change().await;
        assert!(view.tasks()[0].is_public);
    }

    #[tokio::test]
    async fn live_list_orders_newest_first() {
        let store = Store::new();
        let tasks = store.collection(TASKS_COLLECTION);
        let mut view = TaskListView::open(&store, ana()).await.unwrap();

        create_task(&tasks, &ana(), &TaskForm::new("first", false))
            .await
            .unwrap();
        create_task(&tasks, &ana(), &TaskForm::new("second", false))
            .await
            .unwrap();
        view.next_change().await;
        view.next_change().await;

        let bodies: Vec<_> = view.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(bodies, ["second", "first"]);
    }

    #[tokio::test]
    async fn delete_removes_only_the_owners_entry() {
        let store = Store::new();
        let tasks = store.collection(TASKS_COLLECTION);

        let mut ana_view = TaskListView::open(&store, ana()).await.unwrap();
        let mut bea_view = TaskListView::open(&store, bea()).await.unwrap();

        let ana_task = create_task(&tasks, &ana(), &TaskForm::new("mine", false))
            .await
            .unwrap();
        create_task(&tasks, &bea(), &TaskForm::new("hers", false))
            .await
            .unwrap();
        ana_view.next_change().await;
        ana_view.next_change().await;
        bea_view.next_change().await;
        bea_view.next_change().await;
        assert_eq!(ana_view.tasks().len(), 1);
        assert_eq!(bea_view.tasks().len(), 1);

        delete_task(&tasks, ana_task).await.unwrap();
        ana_view.next_change().await;
        bea_view.next_change().await;

        assert!(ana_view.tasks().is_empty());
        assert_eq!(bea_view.tasks().len(), 1);
        assert_eq!(bea_view.tasks()[0].text, "hers");
    }

    #[tokio::test]
    async fn set_identity_resubscribes_to_the_new_owner() {
        let store = Store::new();
        let tasks = store.collection(TASKS_COLLECTION);
        create_task(&tasks, &ana(), &TaskForm::new("ana's", false))
            .await
            .unwrap();
        create_task(&tasks, &bea(), &TaskForm::new("bea's", false))
            .await
            .unwrap();

        let mut view = TaskListView::open(&store, ana()).await.unwrap();
        assert_eq!(view.tasks()[0].text, "ana's");

        view.set_identity(bea()).await.unwrap();
        assert_eq!(view.tasks().len(), 1);
        assert_eq!(view.tasks()[0].text, "bea's");
    }

    #[tokio::test]
    async fn composer_rejects_whitespace_before_any_store_call() {
        let store = Store::new();
        let tasks = store.collection(TASKS_COLLECTION);

        let mut composer = TaskComposer::new();
        composer.text = "   ".into();
        assert_eq!(composer.submit(&tasks, &ana()).await, None);

        assert_eq!(composer.field_error().unwrap().message, "Enter a task.");
        assert_eq!(tasks.count().await.unwrap(), 0);
        // The rejected text stays put for correction.
        assert_eq!(composer.text, "   ");
    }

    #[tokio::test]
    async fn composer_clears_the_form_on_success() {
        let store = Store::new();
        let tasks = store.collection(TASKS_COLLECTION);

        let mut composer = TaskComposer::new();
        composer.text = "Buy milk".into();
        composer.is_public = true;
        let id = composer.submit(&tasks, &ana()).await.unwrap();

        assert!(composer.text.is_empty());
        assert!(!composer.is_public);
        assert!(composer.field_error().is_none());
        assert!(composer.submit_error().is_none());
        assert!(tasks.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn detail_access_redirects_for_missing_and_private_tasks() {
        let store = Store::new();
        let tasks = store.collection(TASKS_COLLECTION);

        assert!(matches!(
            load_public_task(&store, Uuid::new_v4()).await.unwrap(),
            TaskAccess::Redirect
        ));

        let private = create_task(&tasks, &ana(), &TaskForm::new("Buy milk", false))
            .await
            .unwrap();
        assert!(matches!(
            load_public_task(&store, private).await.unwrap(),
            TaskAccess::Redirect
        ));

        let public = create_task(&tasks, &ana(), &TaskForm::new("Buy milk", true))
            .await
            .unwrap();
        match load_public_task(&store, public).await.unwrap() {
            TaskAccess::Granted(task) => assert_eq!(task.text, "Buy milk"),
            TaskAccess::Redirect => panic!("public task should render"),
        }
    }

    #[test]
    fn share_link_uses_the_public_origin() {
        let id = Uuid::new_v4();
        assert_eq!(
            share_link(Some("https://taskpad.example"), id),
            format!("https://taskpad.example/task/{id}")
        );
        assert_eq!(
            share_link(Some("https://taskpad.example/"), id),
            format!("https://taskpad.example/task/{id}")
        );
        // Absent origin: malformed link, not an error.
        assert_eq!(share_link(None, id), format!("/task/{id}"));
    }

    #[test]
    fn share_places_the_link_on_the_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        let id = Uuid::new_v4();
        let link = share_task(&mut clipboard, Some("https://taskpad.example"), id).unwrap();
        assert_eq!(clipboard.contents(), Some(link.as_str()));
    }
}
