//! SQLite pool setup and the embedded schema.

use anyhow::{Context, Result};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{fs, path::Path, str::FromStr, sync::Arc};

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Open a pool for `url`, creating the database file and its directory if needed.
pub async fn connect(url: &str, max_connections: u32) -> Result<Arc<SqlitePool>> {
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");

    if !in_memory {
        let path = url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:")
            .trim_start_matches("file:");
        let path = path.split('?').next().unwrap_or(path);
        tracing::debug!("Interpreted SQLite path => {}", path);

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating database directory {:?}", parent))?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
    }

    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("parsing database url `{}`", url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        // every connection to `:memory:` is its own database; keep the one we have
        pool = pool.idle_timeout(None).max_lifetime(None);
    }
    let pool = pool
        .connect_with(options)
        .await
        .with_context(|| format!("connecting to {}", url))?;
    Ok(Arc::new(pool))
}

/// Run the embedded schema statement by statement. Safe to re-run.
pub async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let statements = SCHEMA
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt)
            .execute(db)
            .await
            .with_context(|| format!("running migration statement: {}", stmt))?;
    }
    Ok(())
}

/// A migrated single-connection in-memory database.
pub async fn memory_pool() -> Result<Arc<SqlitePool>> {
    let db = connect("sqlite::memory:", 1).await?;
    run_migrations(&db).await?;
    Ok(db)
}
