//! Persistence seam for config entries and its PostgreSQL implementation.

use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tokio::time::Instant;

const UPSERT_SQL: &str = r#"
    INSERT INTO config_entries (key, value, updated_at)
    VALUES ($1, $2, NOW())
    ON CONFLICT (key)
    DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
"#;

/// Text-valued key store. Values are already encoded; callers own the JSON boundary.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// All entries ordered by key ascending.
    async fn entries(&self) -> Result<Vec<(String, String)>, AppError>;

    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Conflict-replacing insert of one entry.
    async fn put(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Apply every entry in one transaction. Either all are written or none are.
    /// When `deadline` passes before commit the transaction is rolled back with `AppError::Timeout`.
    async fn put_all(
        &self,
        entries: &[(String, String)],
        deadline: Option<Instant>,
    ) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PgKvStore {
    pool: PgPool,
}

impl PgKvStore {
    pub fn new(pool: PgPool) -> Self {
        PgKvStore { pool }
    }
}

async fn upsert_each(conn: &mut PgConnection, entries: &[(String, String)]) -> Result<u64, AppError> {
    let mut count = 0u64;
    for (key, value) in entries {
        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(value)
            .execute(&mut *conn)
            .await?;
        count += 1;
    }
    Ok(count)
}

#[async_trait]
impl KvStore for PgKvStore {
    async fn entries(&self) -> Result<Vec<(String, String)>, AppError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM config_entries ORDER BY key")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM config_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn put_all(
        &self,
        entries: &[(String, String)],
        deadline: Option<Instant>,
    ) -> Result<u64, AppError> {
        // The transaction holds one pooled connection; it goes back to the pool when `tx` drops.
        let mut tx = self.pool.begin().await?;
        let outcome = match deadline {
            Some(at) => match tokio::time::timeout_at(at, upsert_each(&mut tx, entries)).await {
                Ok(res) => res,
                Err(_) => Err(AppError::Timeout("bulk config transaction".into())),
            },
            None => upsert_each(&mut tx, entries).await,
        };
        match outcome {
            Ok(count) => {
                tx.commit().await?;
                tracing::debug!(count, "config bulk upsert committed");
                Ok(count)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    tracing::error!(error = %rb, "config bulk upsert rollback failed");
                }
                Err(e)
            }
        }
    }
}
