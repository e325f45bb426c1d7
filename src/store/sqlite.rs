// src/store/sqlite.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::path::Path;

use crate::errors::Result;
use crate::models::{ErrorRecord, HomeworkStatus, SubmissionState};
use crate::store::StateStore;

/// Durable store backed by SQLite. Both tables are append-only; the row with
/// the highest id is the current value.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and applies migrations.
    pub async fn open(db_path: &Path) -> Result<Self> {
        // Create parent directory BEFORE attempting to connect
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let absolute_path = if db_path.is_relative() {
            std::env::current_dir()?.join(db_path)
        } else {
            db_path.to_path_buf()
        };

        let db_url = format!("sqlite://{}?mode=rwc", absolute_path.display());
        log::info!("Opening state database at {}", absolute_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database, mainly for tests.
    pub async fn in_memory() -> Result<Self> {
        // Every connection to :memory: is a separate database, so pin a single one.
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::debug!("State database migrations completed");
        Ok(Self { pool })
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn last_submission(&self) -> Result<Option<SubmissionState>> {
        let row = sqlx::query(
            r#"
            SELECT name, status, cursor
            FROM submissions
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.try_get("status")?;
        Ok(Some(SubmissionState {
            name: row.try_get("name")?,
            status: status.parse::<HomeworkStatus>()?,
            cursor: row.try_get("cursor")?,
        }))
    }

    async fn last_error(&self) -> Result<Option<ErrorRecord>> {
        let row = sqlx::query(
            r#"
            SELECT message, created_on
            FROM errors
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let created_on: String = row.try_get("created_on")?;
        let created_on = DateTime::parse_from_rfc3339(&created_on)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(Some(ErrorRecord {
            message: row.try_get("message")?,
            created_on,
        }))
    }

    async fn record_submission(&self, name: &str, status: HomeworkStatus, cursor: i64) -> Result<()> {
        sqlx::query("INSERT INTO submissions (name, status, cursor) VALUES (?, ?, ?)")
            .bind(name)
            .bind(status.as_str())
            .bind(cursor)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_error(&self, message: &str) -> Result<()> {
        sqlx::query("INSERT INTO errors (message, created_on) VALUES (?, ?)")
            .bind(message)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
