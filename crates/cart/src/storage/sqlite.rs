//! SQLite-backed local storage (durable `localStorage` equivalent).

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use super::CartStorage;
use crate::error::StorageError;

/// Key-value storage in a SQLite database.
///
/// The connection is opened lazily on first use. The pool holds a single
/// connection that is never recycled, so writes are applied in issue order
/// and `sqlite::memory:` databases live as long as the storage handle.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    url: String,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteStorage {
    /// Create a storage handle for a `sqlite:` URL (lazy initialization).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Storage in the OS app data directory: `{app_data_dir}/rocketshoes/storage.db`.
    pub fn default_location() -> anyhow::Result<Self> {
        let db_path = storage_db_path()
            .context("failed to determine storage DB path - ensure app data directory is accessible")?;
        Ok(Self::new(format!("sqlite://{}", db_path.to_string_lossy())))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the pool, connecting and creating the table if necessary.
    async fn get_pool(&self) -> Result<SqlitePool, StorageError> {
        let mut pool_guard = self.pool.lock().await;
        if let Some(pool) = pool_guard.as_ref() {
            return Ok(pool.clone());
        }

        let pool = connect(&self.url)
            .await
            .map_err(|err| StorageError::Unavailable(format!("{err:#}")))?;

        *pool_guard = Some(pool.clone());
        Ok(pool)
    }
}

async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid SQLite URL {url:?}"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open SQLite storage at {url:?}"))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS local_storage (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .context("failed to create local_storage table")?;

    tracing::debug!("opened local storage at {url}");
    Ok(pool)
}

#[async_trait]
impl CartStorage for SqliteStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let pool = self.get_pool().await?;

        let row = sqlx::query(
            r#"
            SELECT value
            FROM local_storage
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let pool = self.get_pool().await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&pool)
        .await?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let pool = self.get_pool().await?;

        sqlx::query(
            r#"
            DELETE FROM local_storage
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .execute(&pool)
        .await?;

        Ok(())
    }
}

/// Resolve the path to the SQLite storage database and create its directory.
fn storage_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|mut h| {
            h.push(".local");
            h.push("share");
            h
        }))
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut dir = base;
    dir.push("rocketshoes");

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create storage directory at {:?}", dir))?;

    dir.push("storage.db");

    Ok(dir)
}
