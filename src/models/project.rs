//! Represents a project: the collection that owns buckets and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project.
///
/// `default_bucket_id` and `done_bucket_id` use 0 for "not configured".
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: i64,

    /// Bucket new tasks land in when no bucket is given.
    pub default_bucket_id: i64,

    /// Bucket whose membership marks a task as done.
    pub done_bucket_id: i64,

    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Partial project update. Bucket references accept 0 to unset them.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub default_bucket_id: Option<i64>,
    pub done_bucket_id: Option<i64>,
}

/// Grants a user access to a project.
#[derive(Deserialize, Debug, Clone)]
pub struct ProjectShare {
    pub user_id: i64,
    /// 0 = read, 1 = read & write, 2 = admin.
    #[serde(default)]
    pub right: i64,
}
