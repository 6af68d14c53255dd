//! Represents a task: the orderable item living in a project and one of its buckets.

use super::{label::Label, user::User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single task.
///
/// A task carries two independent ordering keys: `position` orders it in the
/// project's list view, `kanban_position` orders it inside its current bucket.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub done: bool,
    pub done_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: i64,
    pub percent_done: f64,
    pub project_id: i64,

    /// Foreign key to the bucket the task currently sits in.
    pub bucket_id: i64,

    /// List-view ordering key, scoped to the project.
    pub position: f64,

    /// Kanban ordering key, scoped to `bucket_id`.
    pub kanban_position: f64,

    #[sqlx(skip)]
    #[serde(default)]
    pub labels: Vec<Label>,

    #[sqlx(skip)]
    #[serde(default)]
    pub assignees: Vec<User>,

    #[sqlx(skip)]
    #[serde(default)]
    pub created_by: Option<User>,

    #[serde(skip)]
    pub created_by_id: i64,

    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Payload for creating a task.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    /// Target bucket; the project's default bucket when absent.
    pub bucket_id: Option<i64>,
    #[serde(default)]
    pub priority: i64,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub percent_done: f64,
}

/// Partial update of a task's plain fields. Ordering goes through [`MoveTask`].
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
    pub priority: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub percent_done: Option<f64>,
}

/// Which ordering a move applies to.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PositionScope {
    /// `kanban_position`, within a bucket.
    #[default]
    Kanban,
    /// `position`, within the project list.
    List,
}

/// A drag-and-drop move: the neighbors the task should end up between.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct MoveTask {
    /// Destination bucket for Kanban moves; the current bucket when absent.
    pub bucket_id: Option<i64>,
    /// Task that ends up directly before the moved task.
    pub before_id: Option<i64>,
    /// Task that ends up directly after the moved task.
    pub after_id: Option<i64>,
    #[serde(default)]
    pub scope: PositionScope,
}
