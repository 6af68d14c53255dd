//! HTTP handler for bulk imports.

use crate::{
    auth::Actor,
    errors::AppError,
    models::{import::ProjectImport, project::Project},
    services::import_service::ImportService,
};
use axum::{Json, extract::State, http::StatusCode};

/// `PUT /import`: body is a list of projects with nested buckets, tasks and labels.
pub async fn import_projects(
    State(imports): State<ImportService>,
    Actor(actor): Actor,
    Json(projects): Json<Vec<ProjectImport>>,
) -> Result<(StatusCode, Json<Vec<Project>>), AppError> {
    let created = imports.import(actor, projects).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
