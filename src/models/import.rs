//! Payload of a bulk import: projects with their buckets, tasks and labels.
//!
//! Nothing here carries an id. The database issues ids while the hierarchy is
//! inserted.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProjectImport {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Buckets in board order.
    #[serde(default)]
    pub buckets: Vec<BucketImport>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BucketImport {
    pub title: String,
    #[serde(default)]
    pub limit: i64,
    /// Tasks in Kanban order.
    #[serde(default)]
    pub tasks: Vec<TaskImport>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskImport {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub labels: Vec<LabelImport>,
    /// Rendered into the description as task lists.
    #[serde(default)]
    pub checklists: Vec<ChecklistImport>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChecklistImport {
    pub name: String,
    #[serde(default)]
    pub items: Vec<ChecklistItemImport>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChecklistItemImport {
    pub name: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LabelImport {
    pub title: String,
    /// Color name of the source board, e.g. `green` or `sky_dark`.
    #[serde(default)]
    pub color: String,
}
