//! BucketService: Kanban bucket lifecycle backed by SQLite.
//!
//! Invariants enforced here:
//! - a project always keeps at least one bucket
//! - a project's default/done bucket references never point at a deleted bucket
//! - tasks of a deleted bucket move to the project's fallback bucket
//!
//! Every public operation runs in a single transaction.

use super::{permissions, position, project_service, user_service};
use crate::{
    errors::{ServiceError, ServiceResult},
    models::{
        bucket::{Bucket, BucketUpdate, NewBucket},
        project::Project,
        user::User,
    },
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};

const BUCKET_COLUMNS: &str =
    r#"id, title, project_id, "limit", position, created_by_id, created, updated"#;

#[derive(Clone)]
pub struct BucketService {
    pub db: Arc<SqlitePool>,
}

impl BucketService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// All buckets of a project, ascending by position. Tasks are not loaded.
    pub async fn list_by_project(&self, actor: i64, project_id: i64) -> ServiceResult<Vec<Bucket>> {
        let mut conn = self.db.acquire().await?;
        let project = permissions::readable_project(&mut conn, actor, project_id).await?;
        list_buckets(&mut conn, project.id).await
    }

    pub async fn get(&self, actor: i64, project_id: i64, bucket_id: i64) -> ServiceResult<Bucket> {
        let mut conn = self.db.acquire().await?;
        let project = permissions::readable_project(&mut conn, actor, project_id).await?;
        let mut bucket = fetch_bucket(&mut conn, project.id, bucket_id).await?;
        let creators = user_service::fetch_users(&mut conn, [bucket.created_by_id]).await?;
        bucket.created_by = creators.get(&bucket.created_by_id).cloned();
        Ok(bucket)
    }

    /// Create a bucket at the end of the board unless a position is given.
    pub async fn create(&self, actor: i64, project_id: i64, new: NewBucket) -> ServiceResult<Bucket> {
        let mut tx = self.db.begin().await?;
        let project = permissions::writable_project(&mut tx, actor, project_id).await?;
        let creator = user_service::require_actor(&mut tx, actor).await?;
        let bucket = insert_bucket(&mut tx, project.id, &new, &creator).await?;
        tx.commit().await?;

        info!(
            "created bucket {} in project {} at position {}",
            bucket.id, project.id, bucket.position
        );
        Ok(bucket)
    }

    /// Update title, limit and/or position. Nothing else is writable.
    pub async fn update(
        &self,
        actor: i64,
        project_id: i64,
        bucket_id: i64,
        patch: BucketUpdate,
    ) -> ServiceResult<Bucket> {
        let mut tx = self.db.begin().await?;
        let project = permissions::writable_project(&mut tx, actor, project_id).await?;
        let mut bucket = fetch_bucket(&mut tx, project.id, bucket_id).await?;

        if let Some(title) = patch.title {
            bucket.title = validate_title(&title)?;
        }
        if let Some(limit) = patch.limit {
            bucket.limit = validate_limit(limit)?;
        }
        if let Some(position) = patch.position {
            if !position.is_finite() {
                return Err(ServiceError::Validation("position must be finite".into()));
            }
            bucket.position = position;
        }
        bucket.updated = Utc::now();

        sqlx::query(
            r#"UPDATE buckets SET title = ?, "limit" = ?, position = ?, updated = ? WHERE id = ?"#,
        )
        .bind(&bucket.title)
        .bind(bucket.limit)
        .bind(bucket.position)
        .bind(bucket.updated)
        .bind(bucket.id)
        .execute(&mut *tx)
        .await?;

        let creators = user_service::fetch_users(&mut tx, [bucket.created_by_id]).await?;
        bucket.created_by = creators.get(&bucket.created_by_id).cloned();
        tx.commit().await?;

        Ok(bucket)
    }

    /// Delete a bucket without deleting its tasks.
    ///
    /// The project's default/done references are cleared first, then the fallback
    /// bucket is resolved from the updated project, then tasks are moved and the
    /// bucket row is removed.
    pub async fn delete(&self, actor: i64, project_id: i64, bucket_id: i64) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;
        let mut project = permissions::writable_project(&mut tx, actor, project_id).await?;
        let bucket = fetch_bucket(&mut tx, project.id, bucket_id).await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buckets WHERE project_id = ?")
            .bind(project.id)
            .fetch_one(&mut *tx)
            .await?;
        if total <= 1 {
            return Err(ServiceError::LastBucket {
                bucket_id: bucket.id,
                project_id: project.id,
            });
        }

        let mut refs_changed = false;
        if project.default_bucket_id == bucket.id {
            project.default_bucket_id = 0;
            refs_changed = true;
        }
        if project.done_bucket_id == bucket.id {
            project.done_bucket_id = 0;
            refs_changed = true;
        }
        if refs_changed {
            project_service::store_bucket_refs(&mut tx, &project).await?;
            debug!("cleared bucket references to {} on project {}", bucket.id, project.id);
        }

        let fallback = resolve_bucket(&mut tx, &project, Some(bucket.id)).await?;
        let moved = move_all_tasks(&mut tx, &project, bucket.id, fallback).await?;

        sqlx::query("DELETE FROM buckets WHERE id = ?")
            .bind(bucket.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            "deleted bucket {} of project {}, moved {} tasks to bucket {}",
            bucket.id, project.id, moved, fallback
        );
        Ok(())
    }

    /// The bucket new tasks land in: the configured default, else the first bucket.
    pub async fn resolve_default_bucket(&self, project_id: i64) -> ServiceResult<i64> {
        let mut conn = self.db.acquire().await?;
        let project = project_service::fetch_project(&mut conn, project_id).await?;
        default_bucket_id(&mut conn, &project).await
    }
}

fn validate_title(title: &str) -> ServiceResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::Validation("bucket title must not be empty".into()));
    }
    Ok(title.to_string())
}

fn validate_limit(limit: i64) -> ServiceResult<i64> {
    if limit < 0 {
        return Err(ServiceError::Validation("bucket limit must not be negative".into()));
    }
    Ok(limit)
}

/// Insert a bucket and assign its position.
///
/// An explicit non-zero position is kept. Otherwise the bucket goes after the
/// current last bucket, or gets an id-derived key when it is the first one.
pub(crate) async fn insert_bucket(
    conn: &mut SqliteConnection,
    project_id: i64,
    new: &NewBucket,
    creator: &User,
) -> ServiceResult<Bucket> {
    let title = validate_title(&new.title)?;
    let limit = validate_limit(new.limit)?;
    if !new.position.is_finite() {
        return Err(ServiceError::Validation("position must be finite".into()));
    }
    let now = Utc::now();

    let mut bucket = sqlx::query_as::<_, Bucket>(&format!(
        r#"INSERT INTO buckets (title, project_id, "limit", position, created_by_id, created, updated)
           VALUES (?, ?, ?, ?, ?, ?, ?)
           RETURNING {}"#,
        BUCKET_COLUMNS
    ))
    .bind(&title)
    .bind(project_id)
    .bind(limit)
    .bind(new.position)
    .bind(creator.id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    if new.position == 0.0 {
        let tail: Option<f64> =
            sqlx::query_scalar("SELECT MAX(position) FROM buckets WHERE project_id = ? AND id != ?")
                .bind(project_id)
                .bind(bucket.id)
                .fetch_one(&mut *conn)
                .await?;
        bucket.position = match tail {
            Some(tail) => position::allocate(Some(tail), None),
            None => position::default_position(bucket.id, 0.0),
        };
        sqlx::query("UPDATE buckets SET position = ? WHERE id = ?")
            .bind(bucket.position)
            .bind(bucket.id)
            .execute(&mut *conn)
            .await?;
    }

    bucket.created_by = Some(creator.clone());
    Ok(bucket)
}

pub(crate) async fn list_buckets(
    conn: &mut SqliteConnection,
    project_id: i64,
) -> ServiceResult<Vec<Bucket>> {
    let buckets = sqlx::query_as::<_, Bucket>(&format!(
        "SELECT {} FROM buckets WHERE project_id = ? ORDER BY position ASC, id ASC",
        BUCKET_COLUMNS
    ))
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(buckets)
}

/// A bucket of the given project; buckets of other projects count as missing.
pub(crate) async fn fetch_bucket(
    conn: &mut SqliteConnection,
    project_id: i64,
    bucket_id: i64,
) -> ServiceResult<Bucket> {
    sqlx::query_as::<_, Bucket>(&format!(
        "SELECT {} FROM buckets WHERE id = ? AND project_id = ?",
        BUCKET_COLUMNS
    ))
    .bind(bucket_id)
    .bind(project_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(ServiceError::BucketNotFound(bucket_id))
}

pub(crate) async fn default_bucket_id(
    conn: &mut SqliteConnection,
    project: &Project,
) -> ServiceResult<i64> {
    resolve_bucket(conn, project, None).await
}

/// Configured default bucket, else the lowest-position bucket other than `excluding`.
async fn resolve_bucket(
    conn: &mut SqliteConnection,
    project: &Project,
    excluding: Option<i64>,
) -> ServiceResult<i64> {
    if project.default_bucket_id != 0 && Some(project.default_bucket_id) != excluding {
        return Ok(project.default_bucket_id);
    }
    let first: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM buckets WHERE project_id = ? AND id != ?
         ORDER BY position ASC, id ASC LIMIT 1",
    )
    .bind(project.id)
    .bind(excluding.unwrap_or(0))
    .fetch_optional(&mut *conn)
    .await?;
    first.ok_or(ServiceError::BucketNotFound(0))
}

/// Fail when `bucket` is full. A limit of 0 means unlimited.
pub(crate) async fn ensure_capacity(conn: &mut SqliteConnection, bucket: &Bucket) -> ServiceResult<()> {
    if bucket.limit <= 0 {
        return Ok(());
    }
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE bucket_id = ?")
        .bind(bucket.id)
        .fetch_one(&mut *conn)
        .await?;
    if count >= bucket.limit {
        return Err(ServiceError::BucketLimitExceeded {
            bucket_id: bucket.id,
            limit: bucket.limit,
        });
    }
    Ok(())
}

/// Move every task of `from` behind the existing tasks of `to`, keeping their order.
async fn move_all_tasks(
    conn: &mut SqliteConnection,
    project: &Project,
    from: i64,
    to: i64,
) -> ServiceResult<usize> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM tasks WHERE bucket_id = ? ORDER BY kanban_position ASC, id ASC",
    )
    .bind(from)
    .fetch_all(&mut *conn)
    .await?;
    if ids.is_empty() {
        return Ok(0);
    }

    let mut tail: Option<f64> =
        sqlx::query_scalar("SELECT MAX(kanban_position) FROM tasks WHERE bucket_id = ?")
            .bind(to)
            .fetch_one(&mut *conn)
            .await?;
    let into_done = to == project.done_bucket_id;
    let now = Utc::now();

    for id in &ids {
        let kanban_position = position::allocate(tail, None);
        tail = Some(kanban_position);
        sqlx::query(
            "UPDATE tasks SET bucket_id = ?, kanban_position = ?,
                    done = CASE WHEN ? THEN 1 ELSE done END,
                    done_at = CASE WHEN ? AND done = 0 THEN ? ELSE done_at END,
                    updated = ?
             WHERE id = ?",
        )
        .bind(to)
        .bind(kanban_position)
        .bind(into_done)
        .bind(into_done)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::ProjectUpdate;
    use crate::services::testing::{Fixture, new_user};

    #[tokio::test]
    async fn create_without_position_appends_after_last_bucket() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let first = fx.buckets.list_by_project(fx.owner.id, project.id).await.unwrap();
        fx.buckets
            .update(
                fx.owner.id,
                project.id,
                first[0].id,
                BucketUpdate {
                    position: Some(1.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        fx.bucket(project.id, "B", 2.0).await;

        let c = fx.bucket(project.id, "C", 0.0).await;
        assert!(c.position.is_finite());
        assert!(c.position > 2.0);

        let titles: Vec<_> = fx
            .buckets
            .list_by_project(fx.owner.id, project.id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Backlog", "B", "C"]);
    }

    #[tokio::test]
    async fn first_bucket_position_derives_from_its_id() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let buckets = fx.buckets.list_by_project(fx.owner.id, project.id).await.unwrap();
        assert_eq!(
            buckets[0].position,
            position::default_position(buckets[0].id, 0.0)
        );
    }

    #[tokio::test]
    async fn get_hides_buckets_of_other_projects() {
        let fx = Fixture::new().await;
        let mine = fx.project("Mine").await;
        let other = fx.project("Other").await;
        let foreign = fx.bucket(other.id, "Foreign", 0.0).await;

        let err = fx.buckets.get(fx.owner.id, mine.id, foreign.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::BucketNotFound(id) if id == foreign.id));

        let found = fx.buckets.get(fx.owner.id, other.id, foreign.id).await.unwrap();
        assert_eq!(found.title, "Foreign");
        assert_eq!(found.created_by.unwrap().id, fx.owner.id);
    }

    #[tokio::test]
    async fn create_rejects_empty_title_and_negative_limit() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let err = fx
            .buckets
            .create(
                fx.owner.id,
                project.id,
                NewBucket {
                    title: " ".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = fx
            .buckets
            .create(
                fx.owner.id,
                project.id,
                NewBucket {
                    title: "Doing".into(),
                    limit: -1,
                    position: 0.0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn create_requires_write_access() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let stranger = new_user(&fx.users, "stranger").await;
        let err = fx
            .buckets
            .create(
                stranger.id,
                project.id,
                NewBucket {
                    title: "Sneaky".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[tokio::test]
    async fn update_only_touches_given_fields() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let bucket = fx.bucket(project.id, "Doing", 5.0).await;

        let updated = fx
            .buckets
            .update(
                fx.owner.id,
                project.id,
                bucket.id,
                BucketUpdate {
                    limit: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Doing");
        assert_eq!(updated.limit, 3);
        assert_eq!(updated.position, 5.0);
        assert_eq!(updated.created_by.unwrap().id, fx.owner.id);
    }

    #[tokio::test]
    async fn last_bucket_cannot_be_deleted() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let only = fx.buckets.list_by_project(fx.owner.id, project.id).await.unwrap();

        let err = fx
            .buckets
            .delete(fx.owner.id, project.id, only[0].id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::LastBucket { bucket_id, project_id }
                if bucket_id == only[0].id && project_id == project.id
        ));
    }

    #[tokio::test]
    async fn deleting_done_bucket_clears_reference_and_moves_tasks() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let backlog = fx.buckets.list_by_project(fx.owner.id, project.id).await.unwrap()[0].clone();
        let done = fx.bucket(project.id, "Done", 0.0).await;
        fx.projects
            .update(
                fx.owner.id,
                project.id,
                ProjectUpdate {
                    done_bucket_id: Some(done.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let existing = fx.task(project.id, "already in backlog", Some(backlog.id)).await;
        for title in ["one", "two", "three"] {
            fx.task(project.id, title, Some(done.id)).await;
        }

        fx.buckets.delete(fx.owner.id, project.id, done.id).await.unwrap();

        let project = fx.projects.get(fx.owner.id, project.id).await.unwrap();
        assert_eq!(project.done_bucket_id, 0);

        let (tasks, _) = fx.list_tasks(project.id).await;
        assert_eq!(tasks.len(), 4);
        assert!(tasks.iter().all(|t| t.bucket_id == backlog.id));

        let mut in_bucket: Vec<_> = tasks.iter().collect();
        in_bucket.sort_by(|a, b| a.kanban_position.total_cmp(&b.kanban_position));
        assert_eq!(in_bucket[0].id, existing.id);
        let moved: Vec<_> = in_bucket[1..].iter().map(|t| t.title.as_str()).collect();
        assert_eq!(moved, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn deleting_lowest_bucket_falls_back_to_next_one() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let backlog = fx.buckets.list_by_project(fx.owner.id, project.id).await.unwrap()[0].clone();
        let later = fx.bucket(project.id, "Later", 0.0).await;
        let task = fx.task(project.id, "orphan", Some(backlog.id)).await;

        fx.buckets.delete(fx.owner.id, project.id, backlog.id).await.unwrap();

        let moved = fx.tasks.get(fx.owner.id, task.id).await.unwrap();
        assert_eq!(moved.bucket_id, later.id);
    }

    #[tokio::test]
    async fn deleting_bucket_prefers_configured_default() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let doing = fx.bucket(project.id, "Doing", 0.0).await;
        let review = fx.bucket(project.id, "Review", 0.0).await;
        fx.projects
            .update(
                fx.owner.id,
                project.id,
                ProjectUpdate {
                    default_bucket_id: Some(review.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let task = fx.task(project.id, "in progress", Some(doing.id)).await;

        fx.buckets.delete(fx.owner.id, project.id, doing.id).await.unwrap();

        assert_eq!(fx.tasks.get(fx.owner.id, task.id).await.unwrap().bucket_id, review.id);
    }

    #[tokio::test]
    async fn resolve_default_bucket_uses_configured_then_lowest() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let backlog = fx.buckets.list_by_project(fx.owner.id, project.id).await.unwrap()[0].clone();
        let second = fx.bucket(project.id, "Second", 0.0).await;

        assert_eq!(fx.buckets.resolve_default_bucket(project.id).await.unwrap(), backlog.id);

        fx.projects
            .update(
                fx.owner.id,
                project.id,
                ProjectUpdate {
                    default_bucket_id: Some(second.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(fx.buckets.resolve_default_bucket(project.id).await.unwrap(), second.id);
    }

    #[tokio::test]
    async fn capacity_respects_limit() {
        let fx = Fixture::new().await;
        let project = fx.project("Board").await;
        let bucket = fx.bucket(project.id, "Small", 0.0).await;
        fx.buckets
            .update(
                fx.owner.id,
                project.id,
                bucket.id,
                BucketUpdate {
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        fx.task(project.id, "fits", Some(bucket.id)).await;

        let err = fx
            .tasks
            .create(
                fx.owner.id,
                project.id,
                crate::models::task::NewTask {
                    title: "overflow".into(),
                    bucket_id: Some(bucket.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BucketLimitExceeded { limit: 1, .. }));
    }
}
