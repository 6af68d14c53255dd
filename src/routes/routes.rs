//! Defines routes for the task board API.
//!
//! ## Structure
//! - **Users & projects**
//!   - `PUT  /users`: register a user
//!   - `PUT  /projects`: create project (with its first bucket)
//!   - `GET|POST /projects/{project}`: read / update project
//!   - `PUT  /projects/{project}/shares`: share project
//!
//! - **Buckets**
//!   - `GET  /projects/{project}/buckets`: board read (buckets with tasks)
//!   - `PUT  /projects/{project}/buckets`: create bucket
//!   - `GET|POST|DELETE /projects/{project}/buckets/{bucket}`
//!
//! - **Tasks**
//!   - `GET|PUT /projects/{project}/tasks`: list view / create task
//!   - `GET|POST|DELETE /tasks/{task}`
//!   - `POST /tasks/{task}/position`: move / reorder
//!
//! - `PUT /import`: bulk import

use crate::{
    handlers::{
        bucket_handlers::{create_bucket, delete_bucket, get_bucket, read_board, update_bucket},
        health_handlers::{healthz, readyz},
        import_handlers::import_projects,
        project_handlers::{create_project, get_project, share_project, update_project},
        task_handlers::{create_task, delete_task, get_task, list_tasks, move_task, update_task},
        user_handlers::create_user,
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build the router. The caller supplies the `AppState` with `with_state`.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/users", put(create_user))
        .route("/projects", put(create_project))
        .route("/projects/{project}", get(get_project).post(update_project))
        .route("/projects/{project}/shares", put(share_project))
        .route(
            "/projects/{project}/buckets",
            get(read_board).put(create_bucket),
        )
        .route(
            "/projects/{project}/buckets/{bucket}",
            get(get_bucket).post(update_bucket).delete(delete_bucket),
        )
        .route(
            "/projects/{project}/tasks",
            get(list_tasks).put(create_task),
        )
        .route(
            "/tasks/{task}",
            get(get_task).post(update_task).delete(delete_task),
        )
        .route("/tasks/{task}/position", post(move_task))
        .route("/import", put(import_projects))
}
