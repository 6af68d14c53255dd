//! Project-level capability checks.
//!
//! The owner of a project holds every right; other users get what their
//! `project_shares` row grants. Everyone else is denied.

use super::project_service;
use crate::{
    errors::{ServiceError, ServiceResult},
    models::project::Project,
};
use sqlx::SqliteConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Right {
    Read = 0,
    Write = 1,
    Admin = 2,
}

impl Right {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Right::Read),
            1 => Some(Right::Write),
            2 => Some(Right::Admin),
            _ => None,
        }
    }
}

/// The highest right `actor` holds on `project`, if any.
pub async fn project_right(
    conn: &mut SqliteConnection,
    actor: i64,
    project: &Project,
) -> ServiceResult<Option<Right>> {
    if project.owner_id == actor {
        return Ok(Some(Right::Admin));
    }
    let shared: Option<i64> = sqlx::query_scalar(
        r#"SELECT "right" FROM project_shares WHERE project_id = ? AND user_id = ?"#,
    )
    .bind(project.id)
    .bind(actor)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(shared.and_then(Right::from_i64))
}

pub async fn can_read(
    conn: &mut SqliteConnection,
    actor: i64,
    project: &Project,
) -> ServiceResult<bool> {
    Ok(project_right(conn, actor, project).await?.is_some())
}

pub async fn can_write(
    conn: &mut SqliteConnection,
    actor: i64,
    project: &Project,
) -> ServiceResult<bool> {
    Ok(project_right(conn, actor, project)
        .await?
        .is_some_and(|right| right >= Right::Write))
}

pub async fn can_admin(
    conn: &mut SqliteConnection,
    actor: i64,
    project: &Project,
) -> ServiceResult<bool> {
    Ok(project_right(conn, actor, project).await? == Some(Right::Admin))
}

/// Load a project the actor may read, or fail with `Forbidden`.
pub(crate) async fn readable_project(
    conn: &mut SqliteConnection,
    actor: i64,
    project_id: i64,
) -> ServiceResult<Project> {
    let project = project_service::fetch_project(conn, project_id).await?;
    if !can_read(conn, actor, &project).await? {
        return Err(ServiceError::Forbidden);
    }
    Ok(project)
}

/// Load a project the actor may write to, or fail with `Forbidden`.
pub(crate) async fn writable_project(
    conn: &mut SqliteConnection,
    actor: i64,
    project_id: i64,
) -> ServiceResult<Project> {
    let project = project_service::fetch_project(conn, project_id).await?;
    if !can_write(conn, actor, &project).await? {
        return Err(ServiceError::Forbidden);
    }
    Ok(project)
}
