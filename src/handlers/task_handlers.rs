//! HTTP handlers for tasks: list view, CRUD and drag-and-drop moves.

use crate::{
    auth::Actor,
    errors::AppError,
    models::task::{MoveTask, NewTask, Task, TaskUpdate},
    services::{
        task_filter::{TaskFilterOptions, parse_sort},
        task_service::TaskService,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
};
use serde::Deserialize;
use serde_json::{Value, json};

const TOTAL_PAGES: HeaderName = HeaderName::from_static("x-pagination-total-pages");
const RESULT_COUNT: HeaderName = HeaderName::from_static("x-pagination-result-count");

/// Query params shared by the task list and the board read.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub per_page: i64,
    /// Free text search over title and description.
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub filter_timezone: String,
    #[serde(default)]
    pub filter_include_nulls: bool,
    /// Comma separated field names.
    #[serde(default)]
    pub sort_by: String,
    /// Comma separated `asc`/`desc`, matched to `sort_by` by index.
    #[serde(default)]
    pub order_by: String,
}

impl TaskQuery {
    pub fn into_options(self) -> Result<TaskFilterOptions, AppError> {
        Ok(TaskFilterOptions {
            sort: parse_sort(&self.sort_by, &self.order_by)?,
            page: self.page,
            per_page: self.per_page,
            search: self.s,
            filter: self.filter,
            filter_timezone: self.filter_timezone,
            filter_include_nulls: self.filter_include_nulls,
            parsed_filters: None,
        })
    }
}

/// `GET /projects/{project}/tasks`
///
/// Pagination totals are returned in `x-pagination-total-pages` and
/// `x-pagination-result-count`.
pub async fn list_tasks(
    State(tasks): State<TaskService>,
    Actor(actor): Actor,
    Path(project_id): Path<i64>,
    Query(query): Query<TaskQuery>,
) -> Result<(HeaderMap, Json<Vec<Task>>), AppError> {
    let opts = query.into_options()?;
    let page = tasks.list(actor, project_id, &opts).await?;

    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_PAGES, HeaderValue::from(page.total_pages()));
    headers.insert(RESULT_COUNT, HeaderValue::from(page.total));
    Ok((headers, Json(page.tasks)))
}

/// `PUT /projects/{project}/tasks`
pub async fn create_task(
    State(tasks): State<TaskService>,
    Actor(actor): Actor,
    Path(project_id): Path<i64>,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = tasks.create(actor, project_id, new).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /tasks/{task}`
pub async fn get_task(
    State(tasks): State<TaskService>,
    Actor(actor): Actor,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(tasks.get(actor, task_id).await?))
}

/// `POST /tasks/{task}`
pub async fn update_task(
    State(tasks): State<TaskService>,
    Actor(actor): Actor,
    Path(task_id): Path<i64>,
    Json(patch): Json<TaskUpdate>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(tasks.update(actor, task_id, patch).await?))
}

/// `DELETE /tasks/{task}`
pub async fn delete_task(
    State(tasks): State<TaskService>,
    Actor(actor): Actor,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    tasks.delete(actor, task_id).await?;
    Ok(Json(json!({ "message": "Successfully deleted." })))
}

/// `POST /tasks/{task}/position`: returns the task as stored, so clients can
/// reconcile their optimistic copy.
pub async fn move_task(
    State(tasks): State<TaskService>,
    Actor(actor): Actor,
    Path(task_id): Path<i64>,
    Json(mv): Json<MoveTask>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(tasks.move_task(actor, task_id, mv).await?))
}
