//! Shared application state handed to every handler.
//!
//! Handlers extract only the service they need (`State<TaskService>`, ...) through
//! `FromRef`.

use crate::services::{
    board_service::BoardService, bucket_service::BucketService, import_service::ImportService,
    project_service::ProjectService, task_filter::TaskFilterComposer, task_service::TaskService,
    user_service::UserService,
};
use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub users: UserService,
    pub projects: ProjectService,
    pub buckets: BucketService,
    pub tasks: TaskService,
    pub boards: BoardService,
    pub imports: ImportService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, max_items_per_page: i64) -> Self {
        let composer = TaskFilterComposer::new(max_items_per_page);
        Self {
            users: UserService::new(db.clone()),
            projects: ProjectService::new(db.clone()),
            buckets: BucketService::new(db.clone()),
            tasks: TaskService::new(db.clone(), composer.clone()),
            boards: BoardService::new(db.clone(), composer),
            imports: ImportService::new(db.clone()),
            db,
        }
    }
}
