//! TaskService: task CRUD, drag-and-drop moves and the task queries used by reads.
//!
//! A task has two ordering keys. Kanban moves reposition `kanban_position` among the
//! tasks of one bucket; list moves reposition `position` among the tasks of the
//! project. Both use the fractional allocator and fall back to renumbering the
//! scope once its gaps are exhausted.

use super::{
    bucket_service, permissions, position,
    task_filter::{TaskFilterComposer, TaskFilterOptions},
    user_service,
};
use crate::{
    errors::{ServiceError, ServiceResult},
    models::{
        bucket::Bucket,
        label::Label,
        project::Project,
        task::{MoveTask, NewTask, PositionScope, Task, TaskUpdate},
        user::User,
    },
};
use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::{collections::HashMap, slice, sync::Arc};
use tracing::{debug, info};

const TASK_COLUMNS: &str = "id, title, description, done, done_at, due_date, priority, \
     percent_done, project_id, bucket_id, position, kanban_position, created_by_id, created, updated";

/// One page of a project's task list.
#[derive(Debug, Clone)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    /// Number of matching tasks across all pages.
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl TaskPage {
    pub fn total_pages(&self) -> i64 {
        if self.per_page <= 0 {
            return 0;
        }
        (self.total + self.per_page - 1) / self.per_page
    }
}

#[derive(Clone)]
pub struct TaskService {
    pub db: Arc<SqlitePool>,
    composer: TaskFilterComposer,
}

impl TaskService {
    pub fn new(db: Arc<SqlitePool>, composer: TaskFilterComposer) -> Self {
        Self { db, composer }
    }

    /// Create a task in the given bucket, or in the project's default bucket.
    pub async fn create(&self, actor: i64, project_id: i64, new: NewTask) -> ServiceResult<Task> {
        let mut tx = self.db.begin().await?;
        let project = permissions::writable_project(&mut tx, actor, project_id).await?;
        let creator = user_service::require_actor(&mut tx, actor).await?;

        let bucket_id = match new.bucket_id {
            Some(id) => id,
            None => bucket_service::default_bucket_id(&mut tx, &project).await?,
        };
        let bucket = bucket_service::fetch_bucket(&mut tx, project.id, bucket_id).await?;
        bucket_service::ensure_capacity(&mut tx, &bucket).await?;

        let mut task = insert_task(&mut tx, &project, &bucket, &creator, &new, false).await?;
        add_details(&mut tx, slice::from_mut(&mut task)).await?;
        tx.commit().await?;

        info!(
            "created task {} in project {} bucket {}",
            task.id, project.id, bucket.id
        );
        Ok(task)
    }

    pub async fn get(&self, actor: i64, task_id: i64) -> ServiceResult<Task> {
        let mut conn = self.db.acquire().await?;
        let mut task = fetch_task(&mut conn, task_id).await?;
        permissions::readable_project(&mut conn, actor, task.project_id).await?;
        add_details(&mut conn, slice::from_mut(&mut task)).await?;
        Ok(task)
    }

    /// Partial update of plain fields.
    ///
    /// Marking a task done moves it into the project's done bucket when one is
    /// configured. Reopening a task that sits in the done bucket moves it back to the
    /// default bucket.
    pub async fn update(&self, actor: i64, task_id: i64, patch: TaskUpdate) -> ServiceResult<Task> {
        let mut tx = self.db.begin().await?;
        let mut task = fetch_task(&mut tx, task_id).await?;
        let project = permissions::writable_project(&mut tx, actor, task.project_id).await?;

        if let Some(title) = patch.title {
            task.title = validate_title(&title)?;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(percent_done) = patch.percent_done {
            task.percent_done = validate_percent(percent_done)?;
        }
        if let Some(done) = patch.done {
            let done_bucket = project.done_bucket_id;
            let target = if done_bucket == 0 {
                task.bucket_id
            } else if done {
                done_bucket
            } else if task.bucket_id == done_bucket {
                bucket_service::default_bucket_id(&mut tx, &project).await?
            } else {
                task.bucket_id
            };
            if target != task.bucket_id {
                let bucket = bucket_service::fetch_bucket(&mut tx, project.id, target).await?;
                bucket_service::ensure_capacity(&mut tx, &bucket).await?;
                let tail = OrderScope::kanban(target).tail(&mut tx, task.id).await?;
                task.kanban_position = position::allocate(tail, None);
                enter_bucket(&mut task, &project, target);
            }
            mark_done(&mut task, done);
        }
        task.updated = Utc::now();

        store_task(&mut tx, &task).await?;
        add_details(&mut tx, slice::from_mut(&mut task)).await?;
        tx.commit().await?;

        Ok(task)
    }

    pub async fn delete(&self, actor: i64, task_id: i64) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;
        let task = fetch_task(&mut tx, task_id).await?;
        permissions::writable_project(&mut tx, actor, task.project_id).await?;

        for statement in [
            "DELETE FROM label_tasks WHERE task_id = ?",
            "DELETE FROM task_assignees WHERE task_id = ?",
            "DELETE FROM tasks WHERE id = ?",
        ] {
            sqlx::query(statement)
                .bind(task.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!("deleted task {} of project {}", task.id, task.project_id);
        Ok(())
    }

    /// Move a task between two neighbors and/or into another bucket.
    ///
    /// Without neighbors the task goes to the end of its scope. Neighbors must be
    /// in the same scope as the destination. When the gap between them is
    /// exhausted the scope is renumbered and the placement retried once.
    pub async fn move_task(&self, actor: i64, task_id: i64, mv: MoveTask) -> ServiceResult<Task> {
        let mut tx = self.db.begin().await?;
        let mut task = fetch_task(&mut tx, task_id).await?;
        let project = permissions::writable_project(&mut tx, actor, task.project_id).await?;

        let target = mv.bucket_id.unwrap_or(task.bucket_id);
        let bucket_changed = target != task.bucket_id;
        if bucket_changed {
            let bucket = bucket_service::fetch_bucket(&mut tx, project.id, target).await?;
            bucket_service::ensure_capacity(&mut tx, &bucket).await?;
        }

        let scope = match mv.scope {
            PositionScope::Kanban => OrderScope::kanban(target),
            PositionScope::List => OrderScope::list(project.id),
        };
        let placed = place(&mut tx, scope, task.id, mv.before_id, mv.after_id).await?;

        match mv.scope {
            PositionScope::Kanban => task.kanban_position = placed,
            PositionScope::List => {
                task.position = placed;
                if bucket_changed {
                    let tail = OrderScope::kanban(target).tail(&mut tx, task.id).await?;
                    task.kanban_position = position::allocate(tail, None);
                }
            }
        }
        if bucket_changed {
            enter_bucket(&mut task, &project, target);
        }
        task.updated = Utc::now();

        store_task(&mut tx, &task).await?;
        add_details(&mut tx, slice::from_mut(&mut task)).await?;
        tx.commit().await?;

        debug!(
            "moved task {} to bucket {} ({:?} position {})",
            task.id, task.bucket_id, mv.scope, placed
        );
        Ok(task)
    }

    /// The project's list view: filtered, searched, sorted and paginated.
    pub async fn list(
        &self,
        actor: i64,
        project_id: i64,
        opts: &TaskFilterOptions,
    ) -> ServiceResult<TaskPage> {
        let composed = self.composer.compose_for_project(opts)?;

        let mut tx = self.db.begin().await?;
        let project = permissions::readable_project(&mut tx, actor, project_id).await?;
        let (mut tasks, total) = fetch_project_tasks(&mut tx, project.id, &composed).await?;
        add_details(&mut tx, &mut tasks).await?;
        tx.commit().await?;

        Ok(TaskPage {
            tasks,
            total,
            page: composed.page,
            per_page: composed.per_page,
        })
    }
}

fn validate_title(title: &str) -> ServiceResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::Validation("task title must not be empty".into()));
    }
    Ok(title.to_string())
}

fn validate_percent(percent_done: f64) -> ServiceResult<f64> {
    if !(0.0..=1.0).contains(&percent_done) {
        return Err(ServiceError::Validation(
            "percent_done must be between 0 and 1".into(),
        ));
    }
    Ok(percent_done)
}

fn mark_done(task: &mut Task, done: bool) {
    if task.done != done {
        task.done = done;
        task.done_at = done.then(Utc::now);
    }
}

/// Switch the task's bucket and keep `done` in line with the done bucket.
fn enter_bucket(task: &mut Task, project: &Project, bucket_id: i64) {
    let done_bucket = project.done_bucket_id;
    let leaving_done = done_bucket != 0 && task.bucket_id == done_bucket;
    task.bucket_id = bucket_id;
    if done_bucket != 0 && bucket_id == done_bucket {
        mark_done(task, true);
    } else if leaving_done {
        mark_done(task, false);
    }
}

/// The set of tasks one ordering key is compared within.
#[derive(Debug, Clone, Copy)]
struct OrderScope {
    column: &'static str,
    key: &'static str,
    key_id: i64,
}

impl OrderScope {
    fn kanban(bucket_id: i64) -> Self {
        Self {
            column: "kanban_position",
            key: "bucket_id",
            key_id: bucket_id,
        }
    }

    fn list(project_id: i64) -> Self {
        Self {
            column: "position",
            key: "project_id",
            key_id: project_id,
        }
    }

    /// Position of a neighbor, which must be another task of this scope.
    async fn neighbor(
        &self,
        conn: &mut SqliteConnection,
        neighbor_id: i64,
        moving_id: i64,
    ) -> ServiceResult<f64> {
        if neighbor_id == moving_id {
            return Err(ServiceError::Validation(
                "a task cannot be its own neighbor".into(),
            ));
        }
        let found: Option<f64> = sqlx::query_scalar(&format!(
            "SELECT {} FROM tasks WHERE id = ? AND {} = ?",
            self.column, self.key
        ))
        .bind(neighbor_id)
        .bind(self.key_id)
        .fetch_optional(&mut *conn)
        .await?;
        found.ok_or_else(|| {
            ServiceError::Validation(format!(
                "task {} is not in the same {} as the moved task",
                neighbor_id,
                if self.key == "bucket_id" { "bucket" } else { "project" }
            ))
        })
    }

    /// Highest position in the scope, ignoring the moving task.
    async fn tail(&self, conn: &mut SqliteConnection, moving_id: i64) -> ServiceResult<Option<f64>> {
        let tail: Option<f64> = sqlx::query_scalar(&format!(
            "SELECT MAX({}) FROM tasks WHERE {} = ? AND id != ?",
            self.column, self.key
        ))
        .bind(self.key_id)
        .bind(moving_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(tail)
    }

    /// Renumber every task of the scope except the moving one, keeping their order.
    async fn rebalance(&self, conn: &mut SqliteConnection, moving_id: i64) -> ServiceResult<usize> {
        let ids: Vec<i64> = sqlx::query_scalar(&format!(
            "SELECT id FROM tasks WHERE {} = ? AND id != ? ORDER BY {} ASC, id ASC",
            self.key, self.column
        ))
        .bind(self.key_id)
        .bind(moving_id)
        .fetch_all(&mut *conn)
        .await?;

        let update = format!("UPDATE tasks SET {} = ? WHERE id = ?", self.column);
        for (id, value) in ids.iter().zip(position::rebalanced(ids.len())) {
            sqlx::query(&update)
                .bind(value)
                .bind(id)
                .execute(&mut *conn)
                .await?;
        }
        Ok(ids.len())
    }
}

async fn place(
    conn: &mut SqliteConnection,
    scope: OrderScope,
    moving_id: i64,
    before_id: Option<i64>,
    after_id: Option<i64>,
) -> ServiceResult<f64> {
    for attempt in 0..2 {
        let (before, after) = if before_id.is_none() && after_id.is_none() {
            (scope.tail(conn, moving_id).await?, None)
        } else {
            let before = match before_id {
                Some(id) => Some(scope.neighbor(conn, id, moving_id).await?),
                None => None,
            };
            let after = match after_id {
                Some(id) => Some(scope.neighbor(conn, id, moving_id).await?),
                None => None,
            };
            (before, after)
        };

        if let (Some(before), Some(after)) = (before, after) {
            if before > after {
                return Err(ServiceError::Validation(
                    "`before_id` must be ordered before `after_id`".into(),
                ));
            }
        }

        let candidate = position::allocate(before, after);
        if !position::needs_rebalance(before, after, candidate) {
            return Ok(candidate);
        }
        if attempt == 0 {
            let renumbered = scope.rebalance(conn, moving_id).await?;
            info!(
                "rebalanced {} tasks on {} = {}",
                renumbered, scope.key, scope.key_id
            );
        }
    }
    Err(ServiceError::Validation(
        "no room between the given neighbors".into(),
    ))
}

pub(crate) async fn fetch_task(conn: &mut SqliteConnection, id: i64) -> ServiceResult<Task> {
    sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(ServiceError::TaskNotFound(id))
}

/// Insert a task into `bucket` and give it id-derived list and Kanban positions.
///
/// Tasks created in the project's done bucket are done.
pub(crate) async fn insert_task(
    conn: &mut SqliteConnection,
    project: &Project,
    bucket: &Bucket,
    creator: &User,
    new: &NewTask,
    done: bool,
) -> ServiceResult<Task> {
    let title = validate_title(&new.title)?;
    let percent_done = validate_percent(new.percent_done)?;
    let done = done || (project.done_bucket_id != 0 && bucket.id == project.done_bucket_id);
    let now = Utc::now();

    let mut task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (title, description, done, done_at, due_date, priority, percent_done,
                            project_id, bucket_id, created_by_id, created, updated)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&title)
    .bind(&new.description)
    .bind(done)
    .bind(done.then_some(now))
    .bind(new.due_date)
    .bind(new.priority)
    .bind(percent_done)
    .bind(project.id)
    .bind(bucket.id)
    .bind(creator.id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    task.position = position::default_position(task.id, 0.0);
    task.kanban_position = position::default_position(task.id, 0.0);
    sqlx::query("UPDATE tasks SET position = ?, kanban_position = ? WHERE id = ?")
        .bind(task.position)
        .bind(task.kanban_position)
        .bind(task.id)
        .execute(&mut *conn)
        .await?;

    Ok(task)
}

async fn store_task(conn: &mut SqliteConnection, task: &Task) -> ServiceResult<()> {
    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, done = ?, done_at = ?, due_date = ?,
                priority = ?, percent_done = ?, bucket_id = ?, position = ?,
                kanban_position = ?, updated = ?
         WHERE id = ?",
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.done)
    .bind(task.done_at)
    .bind(task.due_date)
    .bind(task.priority)
    .bind(task.percent_done)
    .bind(task.bucket_id)
    .bind(task.position)
    .bind(task.kanban_position)
    .bind(task.updated)
    .bind(task.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

fn push_id_list<'args>(qb: &mut QueryBuilder<'args, Sqlite>, ids: &[i64]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

#[derive(FromRow)]
struct TaskLabelRow {
    task_id: i64,
    #[sqlx(flatten)]
    label: Label,
}

/// Fill labels, assignees and creators of `tasks` with one query per relation.
pub(crate) async fn add_details(conn: &mut SqliteConnection, tasks: &mut [Task]) -> ServiceResult<()> {
    if tasks.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT lt.task_id, l.id, l.title, l.hex_color, l.created_by_id, l.created, l.updated
         FROM label_tasks lt JOIN labels l ON l.id = lt.label_id
         WHERE lt.task_id IN ",
    );
    push_id_list(&mut qb, &ids);
    qb.push(" ORDER BY l.id");
    let label_rows: Vec<TaskLabelRow> = qb.build_query_as().fetch_all(&mut *conn).await?;

    let mut qb =
        QueryBuilder::<Sqlite>::new("SELECT task_id, user_id FROM task_assignees WHERE task_id IN ");
    push_id_list(&mut qb, &ids);
    qb.push(" ORDER BY user_id");
    let assignee_rows: Vec<(i64, i64)> = qb.build_query_as().fetch_all(&mut *conn).await?;

    let user_ids: Vec<i64> = assignee_rows
        .iter()
        .map(|(_, user_id)| *user_id)
        .chain(tasks.iter().map(|t| t.created_by_id))
        .collect();
    let users = user_service::fetch_users(conn, user_ids).await?;

    let mut labels: HashMap<i64, Vec<Label>> = HashMap::new();
    for row in label_rows {
        labels.entry(row.task_id).or_default().push(row.label);
    }
    let mut assignees: HashMap<i64, Vec<User>> = HashMap::new();
    for (task_id, user_id) in assignee_rows {
        if let Some(user) = users.get(&user_id) {
            assignees.entry(task_id).or_default().push(user.clone());
        }
    }

    for task in tasks.iter_mut() {
        task.labels = labels.remove(&task.id).unwrap_or_default();
        task.assignees = assignees.remove(&task.id).unwrap_or_default();
        task.created_by = users.get(&task.created_by_id).cloned();
    }
    Ok(())
}

#[derive(FromRow)]
struct BoardTaskRow {
    #[sqlx(flatten)]
    task: Task,
    row_num: i64,
    bucket_total: i64,
}

/// Tasks of a board read plus the number of matches per bucket.
#[derive(Debug, Default)]
pub(crate) struct BoardTasks {
    pub tasks: Vec<Task>,
    pub totals: HashMap<i64, i64>,
}

/// Run every per-bucket query of a board read as one statement.
///
/// Each entry of `scoped` contributes its composed filter; the filters are ORed and
/// rows are numbered per bucket, so pagination and totals stay per bucket. Sorting,
/// search and pagination are shared and taken from the first entry. The first row
/// of every bucket is always returned so its total is known even past the last page.
pub(crate) async fn fetch_board_tasks(
    conn: &mut SqliteConnection,
    project_id: i64,
    scoped: &[(i64, TaskFilterOptions)],
) -> ServiceResult<BoardTasks> {
    let Some((_, shared)) = scoped.first() else {
        return Ok(BoardTasks::default());
    };
    let offset = shared.offset();

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT * FROM (SELECT t.*, ROW_NUMBER() OVER (PARTITION BY t.bucket_id",
    );
    shared.push_order_by(&mut qb);
    qb.push(
        ") AS row_num, COUNT(*) OVER (PARTITION BY t.bucket_id) AS bucket_total
         FROM tasks t WHERE t.project_id = ",
    );
    qb.push_bind(project_id);
    qb.push(" AND (");
    for (i, (_, opts)) in scoped.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push("(");
        match &opts.parsed_filters {
            Some(expr) => expr.push_sql(&mut qb, opts.filter_include_nulls),
            None => {
                qb.push("1 = 1");
            }
        }
        qb.push(")");
    }
    qb.push(")");
    shared.push_search(&mut qb);
    qb.push(") WHERE row_num = 1 OR (row_num > ");
    qb.push_bind(offset);
    qb.push(" AND row_num <= ");
    qb.push_bind(offset.saturating_add(shared.per_page));
    qb.push(") ORDER BY bucket_id, row_num");

    let rows: Vec<BoardTaskRow> = qb.build_query_as().fetch_all(&mut *conn).await?;
    debug!(
        "board query for project {} over {} buckets returned {} rows",
        project_id,
        scoped.len(),
        rows.len()
    );

    let mut board = BoardTasks::default();
    for row in rows {
        board.totals.insert(row.task.bucket_id, row.bucket_total);
        if row.row_num > offset {
            board.tasks.push(row.task);
        }
    }
    Ok(board)
}

/// One page of a project's tasks plus the total number of matches.
pub(crate) async fn fetch_project_tasks(
    conn: &mut SqliteConnection,
    project_id: i64,
    opts: &TaskFilterOptions,
) -> ServiceResult<(Vec<Task>, i64)> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tasks t WHERE t.project_id = ");
    count.push_bind(project_id);
    opts.push_conditions(&mut count);
    let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT t.* FROM tasks t WHERE t.project_id = ");
    qb.push_bind(project_id);
    opts.push_conditions(&mut qb);
    opts.push_order_by(&mut qb);
    qb.push(" LIMIT ");
    qb.push_bind(opts.per_page);
    qb.push(" OFFSET ");
    qb.push_bind(opts.offset());
    let tasks: Vec<Task> = qb.build_query_as().fetch_all(&mut *conn).await?;

    Ok((tasks, total))
}
