//! UserService: accounts referenced as creators, owners and assignees.

use crate::{
    errors::{ServiceError, ServiceResult},
    models::user::{NewUser, User},
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool, sqlite::Sqlite};
use std::{collections::HashMap, sync::Arc};
use tracing::info;

#[derive(Clone)]
pub struct UserService {
    pub db: Arc<SqlitePool>,
}

impl UserService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Register a user. Usernames are unique.
    pub async fn create(&self, new: NewUser) -> ServiceResult<User> {
        let username = new.username.trim();
        if username.is_empty() {
            return Err(ServiceError::Validation("username must not be empty".into()));
        }

        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, name, created) VALUES (?, ?, ?)
             RETURNING id, username, name, created",
        )
        .bind(username)
        .bind(new.name.trim())
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match result {
            Ok(user) => {
                info!("registered user {} ({})", user.id, user.username);
                Ok(user)
            }
            Err(err) if is_unique_violation(&err) => Err(ServiceError::Validation(format!(
                "username `{}` is already taken",
                username
            ))),
            Err(err) => Err(ServiceError::Sqlx(err)),
        }
    }
}

pub(crate) async fn fetch_user(conn: &mut SqliteConnection, id: i64) -> ServiceResult<User> {
    sqlx::query_as::<_, User>("SELECT id, username, name, created FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(ServiceError::UserNotFound(id))
}

/// The acting user; an id without an account is treated as unauthenticated.
pub(crate) async fn require_actor(conn: &mut SqliteConnection, id: i64) -> ServiceResult<User> {
    match fetch_user(conn, id).await {
        Err(ServiceError::UserNotFound(_)) => Err(ServiceError::Unauthenticated),
        other => other,
    }
}

/// Load many users in one query, keyed by id. Unknown ids are simply absent.
pub(crate) async fn fetch_users(
    conn: &mut SqliteConnection,
    ids: impl IntoIterator<Item = i64>,
) -> ServiceResult<HashMap<i64, User>> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder =
        QueryBuilder::<Sqlite>::new("SELECT id, username, name, created FROM users WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in &ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let users: Vec<User> = builder.build_query_as().fetch_all(&mut *conn).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Return true if SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn duplicate_username_is_a_validation_error() {
        let pool = db::memory_pool().await.unwrap();
        let service = UserService::new(pool);
        service
            .create(NewUser {
                username: "ada".into(),
                name: "Ada".into(),
            })
            .await
            .unwrap();
        let err = service
            .create(NewUser {
                username: "ada".into(),
                name: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn batch_lookup_skips_unknown_ids() {
        let pool = db::memory_pool().await.unwrap();
        let service = UserService::new(pool.clone());
        let ada = service
            .create(NewUser {
                username: "ada".into(),
                name: String::new(),
            })
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let users = fetch_users(&mut conn, [ada.id, ada.id, 999]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[&ada.id].username, "ada");

        let err = require_actor(&mut conn, 999).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated));
    }
}
