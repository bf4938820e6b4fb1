//! HTTP surface: page routes, form endpoints, the live dashboard feed and
//! the auth cookie glue.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use futures::stream;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use taskpad_app::{
    create_task, delete_task, list_tasks, load_public_task, protect, share_link, CommentThread,
    Gate, IdentityProvider, MemorySessions, TaskAccess, TaskListView, TASKS_COLLECTION,
};
use taskpad_shared::{CommentForm, Session, TaskForm, UserSnapshot};
use taskpad_store::Store;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::landing::StatsCache;
use crate::pages::{self, CommentFormView, TaskFormView};

/// Cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "taskpad_session";

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: Arc<MemorySessions>,
    pub stats: Arc<StatsCache>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(landing))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/events", get(dashboard_events))
        .route("/tasks", post(create_task_submit))
        .route("/tasks/{id}/delete", post(delete_task_submit))
        .route("/tasks/{id}/share", get(share_task_url))
        .route("/task/{id}", get(task_detail))
        .route("/task/{id}/comments", post(create_comment_submit))
        .route("/comments/{id}/delete", post(delete_comment_submit))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Session helpers
// ---------------------------------------------------------------------------

fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Optional session lookup for pages anyone may view.
async fn current_session(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Option<Session>, ServerError> {
    match session_token(jar) {
        Some(token) => state
            .sessions
            .session(&token)
            .await
            .map_err(ServerError::from),
        None => Ok(None),
    }
}

/// Session gate for protected pages.
async fn gate(state: &AppState, jar: &CookieJar) -> Result<Gate, ServerError> {
    let token = session_token(jar);
    protect(state.sessions.as_ref(), token.as_deref())
        .await
        .map_err(ServerError::from)
}

// ---------------------------------------------------------------------------
// Landing
// ---------------------------------------------------------------------------

async fn landing(State(state): State<AppState>, jar: CookieJar) -> Result<Response, ServerError> {
    let session = current_session(&state, &jar).await?;
    // Either count failing fails the whole render; no partial display.
    let stats = state.stats.get(&state.store).await?;
    Ok(Html(pages::landing_page(session.as_ref(), &stats)).into_response())
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ServerError> {
    let session = match gate(&state, &jar).await? {
        Gate::Allowed(session) => session,
        Gate::Redirect(to) => return Ok(Redirect::temporary(to).into_response()),
    };

    let tasks = list_tasks(&state.store, &session.user).await?;
    let page = pages::dashboard_page(&session, &tasks, &TaskFormView::default());
    Ok(Html(page).into_response())
}

/// Live feed behind the dashboard: one SSE event per change, each carrying
/// the full current task list. Dropping the connection drops the stream,
/// which releases the store subscription.
async fn dashboard_events(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ServerError> {
    let session = match gate(&state, &jar).await? {
        Gate::Allowed(session) => session,
        Gate::Redirect(to) => return Ok(Redirect::temporary(to).into_response()),
    };

    let view = TaskListView::open(&state.store, session.user.clone()).await?;
    let stream = stream::unfold((view, true), |(mut view, first)| async move {
        if !first && !view.next_change().await {
            return None;
        }
        match Event::default().json_data(view.tasks()) {
            Ok(event) => Some((Ok::<_, std::convert::Infallible>(event), (view, false))),
            Err(err) => {
                tracing::error!(error = %err, "failed to encode task snapshot");
                None
            }
        }
    });

    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response())
}

// ---------------------------------------------------------------------------
// Task actions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TaskInput {
    task: String,
    #[serde(default)]
    is_public: Option<String>,
}

fn checkbox(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("true") | Some("on") | Some("1"))
}

async fn create_task_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<TaskInput>,
) -> Result<Response, ServerError> {
    let session = match gate(&state, &jar).await? {
        Gate::Allowed(session) => session,
        Gate::Redirect(to) => return Ok(Redirect::temporary(to).into_response()),
    };

    let form = TaskForm::new(input.task, checkbox(&input.is_public));
    if let Err(err) = form.validate() {
        let tasks = list_tasks(&state.store, &session.user).await?;
        let view = TaskFormView {
            text: &form.text,
            is_public: form.is_public,
            field_error: Some(err.message),
            submit_error: None,
        };
        let page = pages::dashboard_page(&session, &tasks, &view);
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
    }

    let tasks_coll = state.store.collection(TASKS_COLLECTION);
    match create_task(&tasks_coll, &session.user, &form).await {
        Ok(id) => {
            info!(task = %id, owner = %session.user.email, "task created");
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(err) => {
            // Surfaced, not swallowed: the form keeps its contents and the
            // page shows a retry notice.
            tracing::error!(error = %err, "task creation failed");
            let tasks = list_tasks(&state.store, &session.user).await?;
            let message = err.to_string();
            let view = TaskFormView {
                text: &form.text,
                is_public: form.is_public,
                field_error: None,
                submit_error: Some(&message),
            };
            let page = pages::dashboard_page(&session, &tasks, &view);
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response())
        }
    }
}

async fn delete_task_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<Response, ServerError> {
    if let Gate::Redirect(to) = gate(&state, &jar).await? {
        return Ok(Redirect::temporary(to).into_response());
    }

    delete_task(&state.store.collection(TASKS_COLLECTION), id).await?;
    info!(task = %id, "task deleted");
    Ok(Redirect::to("/dashboard").into_response())
}

#[derive(Serialize)]
struct ShareResponse {
    url: String,
}

/// Shareable link for a task. The client-side share action puts this on
/// the user's clipboard.
async fn share_task_url(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<Response, ServerError> {
    if let Gate::Redirect(to) = gate(&state, &jar).await? {
        return Ok(Redirect::temporary(to).into_response());
    }

    let url = share_link(state.config.public_url.as_deref(), id);
    Ok(Json(ShareResponse { url }).into_response())
}

// ---------------------------------------------------------------------------
// Public task detail
// ---------------------------------------------------------------------------

async fn task_detail(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<Response, ServerError> {
    // No gate: a public task is readable by anyone holding its id.
    let session = current_session(&state, &jar).await?;

    let task = match load_public_task(&state.store, id).await? {
        TaskAccess::Granted(task) => task,
        TaskAccess::Redirect => return Ok(Redirect::temporary("/").into_response()),
    };

    let thread = CommentThread::load(&state.store, id).await?;
    let page = pages::task_page(
        &task,
        thread.comments(),
        session.as_ref(),
        &CommentFormView::default(),
    );
    Ok(Html(page).into_response())
}

// ---------------------------------------------------------------------------
// Comment actions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CommentInput {
    comment: String,
}

async fn create_comment_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Form(input): Form<CommentInput>,
) -> Result<Response, ServerError> {
    let Some(session) = current_session(&state, &jar).await? else {
        return Ok(Redirect::temporary("/").into_response());
    };
    let task = match load_public_task(&state.store, id).await? {
        TaskAccess::Granted(task) => task,
        TaskAccess::Redirect => return Ok(Redirect::temporary("/").into_response()),
    };

    let form = CommentForm::new(input.comment);
    if let Err(err) = form.validate() {
        let thread = CommentThread::load(&state.store, id).await?;
        let view = CommentFormView {
            text: &form.text,
            field_error: Some(err.message),
            submit_error: None,
        };
        let page = pages::task_page(&task, thread.comments(), Some(&session), &view);
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
    }

    let mut thread = CommentThread::load(&state.store, id).await?;
    match thread.add(&session.user, &form.text).await {
        Ok(comment_id) => {
            info!(comment = %comment_id, task = %id, author = %session.user.email, "comment created");
            Ok(Redirect::to(&format!("/task/{id}")).into_response())
        }
        Err(err) => {
            tracing::error!(error = %err, "comment creation failed");
            let message = err.to_string();
            let view = CommentFormView {
                text: &form.text,
                field_error: None,
                submit_error: Some(&message),
            };
            let page = pages::task_page(&task, thread.comments(), Some(&session), &view);
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response())
        }
    }
}

#[derive(Deserialize)]
struct DeleteCommentInput {
    task_id: Uuid,
}

async fn delete_comment_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Form(input): Form<DeleteCommentInput>,
) -> Result<Response, ServerError> {
    let Some(session) = current_session(&state, &jar).await? else {
        return Ok(Redirect::temporary("/").into_response());
    };

    // Author-only, enforced against the stored record; anyone else gets 403.
    let mut thread = CommentThread::load(&state.store, input.task_id).await?;
    let removed = thread.delete(&session, id).await?;
    info!(comment = %id, author = %session.user.email, "comment deleted");
    // Redirect to the comment's own task, not wherever the form claimed.
    Ok(Redirect::to(&format!("/task/{}", removed.task_id)).into_response())
}

// ---------------------------------------------------------------------------
// Auth cookie glue
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SigninInput {
    name: String,
    email: String,
    #[serde(default)]
    image: String,
}

/// Establish a session and set the token cookie. In a hosted deployment
/// the OAuth callback lands here with the provider-verified profile.
async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<SigninInput>,
) -> Result<Response, ServerError> {
    let token = state
        .sessions
        .sign_in(UserSnapshot {
            name: input.name,
            email: input.email,
            image: input.image,
        })
        .await;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build();
    Ok((jar.add(cookie), Redirect::to("/dashboard")).into_response())
}

async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ServerError> {
    if let Some(token) = session_token(&jar) {
        state.sessions.sign_out(&token).await;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/")).into_response())
}

// ---------------------------------------------------------------------------
// Serve
// ---------------------------------------------------------------------------

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
