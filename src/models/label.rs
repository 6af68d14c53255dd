use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A colored tag attached to tasks through `label_tasks`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Label {
    pub id: i64,
    pub title: String,
    /// Hex color without the leading `#`; empty means transparent.
    pub hex_color: String,
    #[serde(skip)]
    pub created_by_id: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}
