/// Task endpoints
///
/// Every handler runs behind the session gate and only ever sees tasks
/// owned by the authenticated account. A task of another account is
/// reported exactly like a missing one.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task
/// - `GET /tasks` - List own tasks
/// - `GET /tasks/:id` - Fetch one task
/// - `PATCH /tasks/:id` - Edit text or completion
/// - `DELETE /tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tasklist_shared::{
    auth::middleware::AuthSession,
    models::task::{Task, TaskPatch},
};
use uuid::Uuid;

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task text; trimmed, must not be empty
    #[serde(default)]
    pub text: String,
}

/// Update task request
///
/// `completedAt` may be sent but is ignored; the server stamps it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    /// New text
    pub text: Option<String>,

    /// New completion flag; anything but the boolean `true` marks the
    /// task open
    pub completed: Option<Value>,
}

/// Task list response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    /// Tasks, oldest first
    pub tasks: Vec<Task>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("ID not found".to_string())
}

/// Create a task
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or empty text
pub async fn create_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = payload?;

    let task = state.tasks.create(session.account.id, &req.text).await?;
    Ok(Json(task))
}

/// List own tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = state.tasks.list(session.account.id).await?;
    Ok(Json(TaskListResponse { tasks }))
}

/// Fetch one task
///
/// # Errors
///
/// - `400 Bad Request`: Malformed id
/// - `404 Not Found`: No such task for this account
pub async fn get_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    state
        .tasks
        .get(session.account.id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Edit a task
///
/// Completing stamps `completedAt` with the current time in milliseconds;
/// otherwise the task is reopened and `completedAt` cleared.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed id or body, or empty text
/// - `404 Not Found`: No such task for this account
pub async fn update_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let Json(req) = payload?;

    let patch = TaskPatch {
        text: req.text,
        completed: req.completed.and_then(|v| v.as_bool()),
    };

    state
        .tasks
        .update(session.account.id, id, patch)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Delete a task, answering with the removed task
///
/// # Errors
///
/// - `400 Bad Request`: Malformed id
/// - `404 Not Found`: No such task for this account
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    state
        .tasks
        .delete(session.account.id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}
