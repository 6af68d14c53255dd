//! BoardService reads the Kanban board: every bucket of a project with its tasks.
//!
//! The read runs in one transaction and issues a fixed number of queries no matter
//! how many buckets or tasks the board has: buckets, their creators, one statement
//! for all per-bucket task pages, then one query per task relation.

use super::{
    bucket_service, permissions,
    task_filter::{TaskFilterComposer, TaskFilterOptions},
    task_service, user_service,
};
use crate::{errors::ServiceResult, models::bucket::Bucket};
use sqlx::SqlitePool;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct BoardService {
    pub db: Arc<SqlitePool>,
    composer: TaskFilterComposer,
}

impl BoardService {
    pub fn new(db: Arc<SqlitePool>, composer: TaskFilterComposer) -> Self {
        Self { db, composer }
    }

    /// Buckets of `project_id` in position order, each with its page of matching tasks
    /// and the total number of matches in `count`.
    ///
    /// A filter that pins `bucket_id` narrows the read to those buckets' tasks; the
    /// other buckets are still returned, empty. Tasks pointing at a bucket that is not
    /// on the board are logged and left out.
    pub async fn read_board(
        &self,
        actor: i64,
        project_id: i64,
        opts: &TaskFilterOptions,
    ) -> ServiceResult<Vec<Bucket>> {
        let mut tx = self.db.begin().await?;
        let project = permissions::readable_project(&mut tx, actor, project_id).await?;

        let mut buckets = bucket_service::list_buckets(&mut tx, project.id).await?;
        let index: HashMap<i64, usize> = buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| (bucket.id, i))
            .collect();

        let creators =
            user_service::fetch_users(&mut tx, buckets.iter().map(|b| b.created_by_id)).await?;
        for bucket in buckets.iter_mut() {
            bucket.created_by = creators.get(&bucket.created_by_id).cloned();
        }

        let bucket_ids: Vec<i64> = buckets.iter().map(|b| b.id).collect();
        let scoped = self.composer.compose_for_board(opts, &bucket_ids)?;
        let task_service::BoardTasks { mut tasks, totals } =
            task_service::fetch_board_tasks(&mut tx, project.id, &scoped).await?;
        task_service::add_details(&mut tx, &mut tasks).await?;
        tx.commit().await?;

        for task in tasks {
            match index.get(&task.bucket_id) {
                Some(&i) => buckets[i].tasks.push(task),
                None => warn!(
                    "task {} references bucket {} which is not on project {}",
                    task.id, task.bucket_id, project.id
                ),
            }
        }
        for bucket in buckets.iter_mut() {
            bucket.count = totals.get(&bucket.id).copied().unwrap_or_default();
        }

        debug!(
            "read board of project {}: {} buckets, {} of them queried",
            project.id,
            buckets.len(),
            scoped.len()
        );
        Ok(buckets)
    }
}
