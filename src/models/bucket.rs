//! Represents a Kanban bucket: an ordered column of tasks inside a project.

use super::{task::Task, user::User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A bucket on a project's Kanban board.
///
/// Buckets are owned by exactly one project and are ordered by `position`
/// (ascending). Which bucket is the project's default or done bucket is stored on
/// the project, not here.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Bucket {
    /// The unique, numeric id of this bucket.
    pub id: i64,

    /// The title of this bucket.
    pub title: String,

    /// The project this bucket belongs to.
    pub project_id: i64,

    /// Tasks currently in this bucket, filled in by the board read.
    #[sqlx(skip)]
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// How many tasks may be in this bucket at once (0 = unlimited).
    pub limit: i64,

    /// Number of tasks matching the current read, not persisted.
    #[sqlx(skip)]
    #[serde(default)]
    pub count: i64,

    /// Ordering key among the project's buckets.
    pub position: f64,

    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,

    /// The user who created this bucket.
    #[sqlx(skip)]
    #[serde(default)]
    pub created_by: Option<User>,

    #[serde(skip)]
    pub created_by_id: i64,
}

/// Payload for creating a bucket.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewBucket {
    pub title: String,
    #[serde(default)]
    pub limit: i64,
    /// Explicit position; 0 or absent appends the bucket at the end.
    #[serde(default)]
    pub position: f64,
}

/// Partial update; only these columns are writable after creation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BucketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}
