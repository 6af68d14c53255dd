//! ProjectService: projects and the bucket references stored on them.

use super::{bucket_service, permissions, user_service};
use crate::{
    errors::{ServiceError, ServiceResult},
    models::{
        bucket::NewBucket,
        project::{NewProject, Project, ProjectShare, ProjectUpdate},
        user::User,
    },
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::info;

/// Title of the bucket every new project starts with.
pub const FIRST_BUCKET_TITLE: &str = "Backlog";

#[derive(Clone)]
pub struct ProjectService {
    pub db: Arc<SqlitePool>,
}

impl ProjectService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create a project owned by `actor` together with its first bucket.
    pub async fn create(&self, actor: i64, new: NewProject) -> ServiceResult<Project> {
        let mut tx = self.db.begin().await?;
        let owner = user_service::require_actor(&mut tx, actor).await?;
        let project = insert_project(&mut tx, &owner, &new).await?;
        let first = NewBucket {
            title: FIRST_BUCKET_TITLE.into(),
            ..Default::default()
        };
        bucket_service::insert_bucket(&mut tx, project.id, &first, &owner).await?;
        tx.commit().await?;

        info!("created project {} for user {}", project.id, owner.id);
        Ok(project)
    }

    pub async fn get(&self, actor: i64, id: i64) -> ServiceResult<Project> {
        let mut conn = self.db.acquire().await?;
        permissions::readable_project(&mut conn, actor, id).await
    }

    /// Partial update. Default and done bucket must belong to this project; 0 unsets them.
    pub async fn update(&self, actor: i64, id: i64, patch: ProjectUpdate) -> ServiceResult<Project> {
        let mut tx = self.db.begin().await?;
        let mut project = permissions::writable_project(&mut tx, actor, id).await?;

        if let Some(title) = patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ServiceError::Validation("title must not be empty".into()));
            }
            project.title = title.to_string();
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(bucket_id) = patch.default_bucket_id {
            if bucket_id != 0 {
                bucket_service::fetch_bucket(&mut tx, project.id, bucket_id).await?;
            }
            project.default_bucket_id = bucket_id;
        }
        if let Some(bucket_id) = patch.done_bucket_id {
            if bucket_id != 0 {
                bucket_service::fetch_bucket(&mut tx, project.id, bucket_id).await?;
            }
            project.done_bucket_id = bucket_id;
        }
        project.updated = Utc::now();

        sqlx::query(
            "UPDATE projects SET title = ?, description = ?, default_bucket_id = ?,
                    done_bucket_id = ?, updated = ?
             WHERE id = ?",
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.default_bucket_id)
        .bind(project.done_bucket_id)
        .bind(project.updated)
        .bind(project.id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(project)
    }

    /// Grant (or change) another user's access. Only admins may share.
    pub async fn share(&self, actor: i64, id: i64, share: ProjectShare) -> ServiceResult<()> {
        let right = permissions::Right::from_i64(share.right)
            .ok_or_else(|| ServiceError::Validation(format!("invalid right {}", share.right)))?;

        let mut tx = self.db.begin().await?;
        let project = fetch_project(&mut tx, id).await?;
        if !permissions::can_admin(&mut tx, actor, &project).await? {
            return Err(ServiceError::Forbidden);
        }
        let user = user_service::fetch_user(&mut tx, share.user_id).await?;

        sqlx::query(
            r#"INSERT INTO project_shares (project_id, user_id, "right", created)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(project_id, user_id) DO UPDATE SET "right" = excluded."right""#,
        )
        .bind(project.id)
        .bind(user.id)
        .bind(right as i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("shared project {} with user {} ({:?})", project.id, user.id, right);
        Ok(())
    }
}

pub(crate) async fn insert_project(
    conn: &mut SqliteConnection,
    owner: &User,
    new: &NewProject,
) -> ServiceResult<Project> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(ServiceError::Validation("title must not be empty".into()));
    }
    let now = Utc::now();
    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (title, description, owner_id, created, updated)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id, title, description, owner_id, default_bucket_id, done_bucket_id,
                   created, updated",
    )
    .bind(title)
    .bind(&new.description)
    .bind(owner.id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(project)
}

pub(crate) async fn fetch_project(conn: &mut SqliteConnection, id: i64) -> ServiceResult<Project> {
    sqlx::query_as::<_, Project>(
        "SELECT id, title, description, owner_id, default_bucket_id, done_bucket_id,
                created, updated
         FROM projects WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(ServiceError::ProjectNotFound(id))
}

/// Persist the default/done bucket references of `project`.
pub(crate) async fn store_bucket_refs(
    conn: &mut SqliteConnection,
    project: &Project,
) -> ServiceResult<()> {
    sqlx::query(
        "UPDATE projects SET default_bucket_id = ?, done_bucket_id = ?, updated = ? WHERE id = ?",
    )
    .bind(project.default_bucket_id)
    .bind(project.done_bucket_id)
    .bind(Utc::now())
    .bind(project.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
