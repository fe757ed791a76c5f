//! Shared setup for the PostgreSQL integration tests.

use cotizador::{ensure_database_exists, ensure_tables};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    ensure_database_exists(&url).await.expect("create database");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("connect");
    ensure_tables(&pool).await.expect("bootstrap tables");
    pool
}

/// Prefix that keeps rows from concurrent or repeated runs apart.
pub fn unique(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}-{}", prefix, nanos)
}
