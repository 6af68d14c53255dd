use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An account that can own projects, create buckets and be assigned to tasks.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub created: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub name: String,
}
