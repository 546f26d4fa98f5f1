//! Request handlers: decode the request, make one store call, respond.

use super::AppState;
use super::templates::{self, Context, RowActions, View};
use crate::error::{ApiError, ApiResult};
use crate::types::{NewTask, Task};
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Json, Redirect},
};
use serde::Deserialize;
use tracing::info;

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Form data for task creation.
#[derive(Debug, Deserialize)]
pub struct CreateTaskForm {
    pub title: String,
    pub text: String,
    pub status: Option<String>,
}

impl CreateTaskForm {
    /// Validate the form into a [`NewTask`].
    pub fn into_new_task(self) -> ApiResult<NewTask> {
        if self.title.trim().is_empty() {
            return Err(ApiError::invalid_value("title", "title is required"));
        }
        let status = parse_form_bool(self.status.as_deref())
            .ok_or_else(|| ApiError::invalid_value("status", "status must be a boolean"))?;

        Ok(NewTask::new(self.title, self.text).with_status(status))
    }
}

/// Parse an HTML form boolean. Absent or empty means `false`; `None` means unparseable.
pub fn parse_form_bool(value: Option<&str>) -> Option<bool> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Some(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Count `(done, not_done)` over one listing so the header matches the table.
fn status_counts(tasks: &[Task]) -> (usize, usize) {
    let done = tasks.iter().filter(|t| t.is_done()).count();
    (done, tasks.len() - done)
}

/// Home page - every task.
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let tasks = state.db().list_tasks()?;
    let (done, open) = status_counts(&tasks);

    let mut ctx = Context::new();
    ctx.insert("open_count", open.to_string())
        .insert("done_count", done.to_string())
        .insert(
            "task_table",
            templates::task_table(
                &tasks,
                state.routes(),
                RowActions {
                    mark_done: true,
                    delete: false,
                },
            ),
        );

    Ok(Html(templates::render(View::Main, state.routes(), &ctx)))
}

/// Empty creation form.
pub async fn create_form(State(state): State<AppState>) -> Html<String> {
    Html(templates::render(
        View::CreateTask,
        state.routes(),
        &Context::new(),
    ))
}

/// Create a task from the submitted form and go back to the list.
pub async fn create_task(
    State(state): State<AppState>,
    Form(form): Form<CreateTaskForm>,
) -> ApiResult<Redirect> {
    let new_task = form.into_new_task()?;
    let task = state.db().create_task(new_task)?;
    info!(task_id = task.id, title = %task.title, "Task created");
    Ok(Redirect::to(state.routes().list()))
}

/// Tasks marked done, with delete buttons.
pub async fn list_done(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let tasks = state.db().list_tasks_by_status(true)?;

    let mut ctx = Context::new();
    ctx.insert(
        "task_table",
        templates::task_table(
            &tasks,
            state.routes(),
            RowActions {
                mark_done: false,
                delete: true,
            },
        ),
    );

    Ok(Html(templates::render(
        View::MarkedDone,
        state.routes(),
        &ctx,
    )))
}

/// Tasks not done yet.
pub async fn list_not_done(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let tasks = state.db().list_tasks_by_status(false)?;

    let mut ctx = Context::new();
    ctx.insert(
        "task_table",
        templates::task_table(
            &tasks,
            state.routes(),
            RowActions {
                mark_done: true,
                delete: false,
            },
        ),
    );

    Ok(Html(templates::render(
        View::NotFinished,
        state.routes(),
        &ctx,
    )))
}

/// Mark a task done. Unknown ids are a 404.
pub async fn mark_done(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> ApiResult<Redirect> {
    state.db().mark_task_done(task_id)?;
    info!(task_id, "Task marked done");
    Ok(Redirect::to(state.routes().list()))
}

/// Delete a task permanently. Unknown ids are a 404.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> ApiResult<Redirect> {
    state.db().delete_task(task_id)?;
    info!(task_id, "Task deleted");
    Ok(Redirect::to(state.routes().list()))
}

/// `GET /` in the `main` layout.
pub async fn redirect_home(State(state): State<AppState>) -> Redirect {
    Redirect::to(state.routes().list())
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
