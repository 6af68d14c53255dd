//! HTTP handlers for projects and project sharing.

use crate::{
    auth::Actor,
    errors::AppError,
    models::project::{NewProject, Project, ProjectShare, ProjectUpdate},
    services::project_service::ProjectService,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

/// `PUT /projects`: creates the project together with its first bucket.
pub async fn create_project(
    State(projects): State<ProjectService>,
    Actor(actor): Actor,
    Json(new): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = projects.create(actor, new).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// `GET /projects/{project}`
pub async fn get_project(
    State(projects): State<ProjectService>,
    Actor(actor): Actor,
    Path(project_id): Path<i64>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(projects.get(actor, project_id).await?))
}

/// `POST /projects/{project}`
pub async fn update_project(
    State(projects): State<ProjectService>,
    Actor(actor): Actor,
    Path(project_id): Path<i64>,
    Json(patch): Json<ProjectUpdate>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(projects.update(actor, project_id, patch).await?))
}

/// `PUT /projects/{project}/shares`
pub async fn share_project(
    State(projects): State<ProjectService>,
    Actor(actor): Actor,
    Path(project_id): Path<i64>,
    Json(share): Json<ProjectShare>,
) -> Result<Json<Value>, AppError> {
    projects.share(actor, project_id, share).await?;
    Ok(Json(json!({ "message": "Successfully shared." })))
}
