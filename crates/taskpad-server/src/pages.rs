//! Server-rendered pages.
//!
//! Plain HTML assembled with `format!` — styling and static assets are out
//! of scope. Every piece of user-supplied text goes through
//! [`escape_html`] before it reaches a page.

use taskpad_app::CommentThread;
use taskpad_shared::format::{format_compact, format_date};
use taskpad_shared::{Comment, Session, Task};

use crate::landing::LandingStats;

/// Escape user text for safe inclusion in HTML bodies and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render state for the new-task form: preserved contents plus any
/// field-level or remote error from the last submission.
#[derive(Debug, Default)]
pub struct TaskFormView<'a> {
    pub text: &'a str,
    pub is_public: bool,
    pub field_error: Option<&'a str>,
    pub submit_error: Option<&'a str>,
}

/// Render state for the new-comment form.
#[derive(Debug, Default)]
pub struct CommentFormView<'a> {
    pub text: &'a str,
    pub field_error: Option<&'a str>,
    pub submit_error: Option<&'a str>,
}

fn header(session: Option<&Session>) -> String {
    let right = match session {
        Some(session) => format!(
            concat!(
                r#"<a href="/dashboard">My board</a>"#,
                r#"<form method="post" action="/auth/signout">"#,
                r#"<button type="submit">Hello {name}</button></form>"#
            ),
            name = escape_html(&session.user.name)
        ),
        None => r#"<span>My account</span>"#.to_string(),
    };
    format!(
        r#"<header><nav><a href="/"><h1>Taskpad</h1></a>{right}</nav></header>"#
    )
}

fn layout(title: &str, session: Option<&Session>, main: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\">",
            "<title>{title}</title></head><body>{header}{main}</body></html>"
        ),
        title = escape_html(title),
        header = header(session),
        main = main,
    )
}

fn error_notice(message: &str) -> String {
    format!(
        r#"<p class="error">{} Your text was kept — submit again to retry.</p>"#,
        escape_html(message)
    )
}

fn field_notice(message: &str) -> String {
    format!(r#"<p class="field-error">{}</p>"#, escape_html(message))
}

// ---------------------------------------------------------------------------
// Landing
// ---------------------------------------------------------------------------

pub fn landing_page(session: Option<&Session>, stats: &LandingStats) -> String {
    let main = format!(
        concat!(
            "<main><h1>Organize your studies and tasks, the easy way</h1>",
            "<section>+ {posts} posts</section>",
            "<section>+ {comments} comments</section></main>"
        ),
        posts = format_compact(stats.tasks),
        comments = format_compact(stats.comments),
    );
    layout("Taskpad | Organize your tasks the easy way", session, &main)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn task_article(task: &Task) -> String {
    let public_row = if task.is_public {
        format!(
            concat!(
                r#"<div><label>Public task</label>"#,
                r#"<a class="share" href="/tasks/{id}/share">Share</a></div>"#
            ),
            id = task.id
        )
    } else {
        String::new()
    };

    let body = if task.is_public {
        format!(
            r#"<a href="/task/{id}"><p>{text}</p></a>"#,
            id = task.id,
            text = escape_html(&task.text)
        )
    } else {
        format!("<p>{}</p>", escape_html(&task.text))
    };

    format!(
        concat!(
            "<article>{public_row}{body}",
            "<p>Created on {date}</p>",
            r#"<form method="post" action="/tasks/{id}/delete">"#,
            r#"<button type="submit">Delete</button></form></article>"#
        ),
        public_row = public_row,
        body = body,
        date = format_date(task.created_at),
        id = task.id,
    )
}

pub fn dashboard_page(session: &Session, tasks: &[Task], form: &TaskFormView) -> String {
    let mut notices = String::new();
    if let Some(message) = form.field_error {
        notices.push_str(&field_notice(message));
    }
    if let Some(message) = form.submit_error {
        notices.push_str(&error_notice(message));
    }

    let checked = if form.is_public { " checked" } else { "" };
    let form_html = format!(
        concat!(
            r#"<section><h1>What's your task?</h1>"#,
            r#"<form method="post" action="/tasks">"#,
            r#"<textarea name="task" placeholder="Type your task...">{text}</textarea>{notices}"#,
            r#"<label><input type="checkbox" name="is_public" value="true"{checked}>"#,
            "Leave task public?</label>",
            r#"<button type="submit">Save</button></form></section>"#
        ),
        text = escape_html(form.text),
        notices = notices,
        checked = checked,
    );

    let articles: String = tasks.iter().map(task_article).collect();
    let main = format!(
        "<main>{form_html}<section><h1>My tasks</h1>{articles}</section></main>"
    );
    layout("My task board", Some(session), &main)
}

// ---------------------------------------------------------------------------
// Task detail
// ---------------------------------------------------------------------------

fn comment_article(comment: &Comment, session: Option<&Session>) -> String {
    let delete = if CommentThread::can_delete(session, comment) {
        format!(
            concat!(
                r#"<form method="post" action="/comments/{id}/delete">"#,
                r#"<input type="hidden" name="task_id" value="{task_id}">"#,
                r#"<button type="submit">Delete</button></form>"#
            ),
            id = comment.id,
            task_id = comment.task_id,
        )
    } else {
        String::new()
    };

    format!(
        concat!(
            "<article><div><label>{author}</label>{delete}</div>",
            "<p>{text}</p><p>Created on {date}</p></article>"
        ),
        author = escape_html(&comment.author.name),
        delete = delete,
        text = escape_html(&comment.text),
        date = format_date(comment.created_at),
    )
}

pub fn task_page(
    task: &Task,
    comments: &[Comment],
    session: Option<&Session>,
    form: &CommentFormView,
) -> String {
    let mut notices = String::new();
    if let Some(message) = form.field_error {
        notices.push_str(&field_notice(message));
    }
    if let Some(message) = form.submit_error {
        notices.push_str(&error_notice(message));
    }

    let disabled = if session.is_none() { " disabled" } else { "" };
    let form_html = format!(
        concat!(
            "<section><h2>Leave a comment</h2>",
            r#"<form method="post" action="/task/{id}/comments">"#,
            r#"<textarea name="comment" placeholder="Type your comment...">{text}</textarea>{notices}"#,
            r#"<button type="submit"{disabled}>Send comment</button></form></section>"#
        ),
        id = task.id,
        text = escape_html(form.text),
        notices = notices,
        disabled = disabled,
    );

    let comment_list = if comments.is_empty() {
        "<p>No comments found...</p>".to_string()
    } else {
        comments
            .iter()
            .map(|comment| comment_article(comment, session))
            .collect()
    };

    let main = format!(
        concat!(
            "<main><article><p>{text}</p><p>Created on {date}</p></article>",
            "{form_html}<section><h2>All comments</h2>{comment_list}</section></main>"
        ),
        text = escape_html(&task.text),
        date = format_date(task.created_at),
        form_html = form_html,
        comment_list = comment_list,
    );
    layout("Task details", session, &main)
}
