//! PostgreSQL repository
//!
//! One `records` table keyed by (partition_key, sort_key). Upserts go through
//! `ON CONFLICT`; range scans page on `sort_key > $token ORDER BY sort_key`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::info;

use crate::error::Result;

use super::{Page, QueryPage, Record, Repository, SortRange};

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a new PostgreSQL repository
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a repository from an existing connection pool (zero-cost reuse)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing table if it does not exist
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                partition_key TEXT NOT NULL,
                sort_key      TEXT NOT NULL,
                payload       JSONB NOT NULL,
                updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (partition_key, sort_key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Record {
        Record {
            partition_key: row.get("partition_key"),
            sort_key: row.get("sort_key"),
            payload: row.get("payload"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn get(&self, partition_key: &str, sort_key: &str) -> Result<Option<Record>> {
        let row = sqlx::query(
            r#"
            SELECT partition_key, sort_key, payload, updated_at
            FROM records
            WHERE partition_key = $1 AND sort_key = $2
            "#,
        )
        .bind(partition_key)
        .bind(sort_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    async fn put(&self, record: Record) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO records (partition_key, sort_key, payload, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (partition_key, sort_key) DO UPDATE SET
                payload = EXCLUDED.payload,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&record.partition_key)
        .bind(&record.sort_key)
        .bind(&record.payload)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query(&self, partition_key: &str, range: SortRange, page: Page) -> Result<QueryPage> {
        let limit = page.limit.max(1) as i64;
        let token = page.token.unwrap_or_default();

        // The range narrows the scan; the token positions it. Fetch one extra
        // row to learn whether another page exists.
        let rows = match &range {
            SortRange::All => {
                sqlx::query(
                    r#"
                    SELECT partition_key, sort_key, payload, updated_at
                    FROM records
                    WHERE partition_key = $1 AND sort_key > $2
                    ORDER BY sort_key ASC
                    LIMIT $3
                    "#,
                )
                .bind(partition_key)
                .bind(&token)
                .bind(limit + 1)
                .fetch_all(&self.pool)
                .await?
            }
            SortRange::Prefix(prefix) => {
                sqlx::query(
                    r#"
                    SELECT partition_key, sort_key, payload, updated_at
                    FROM records
                    WHERE partition_key = $1
                      AND sort_key > $2
                      AND sort_key LIKE $3 || '%'
                    ORDER BY sort_key ASC
                    LIMIT $4
                    "#,
                )
                .bind(partition_key)
                .bind(&token)
                .bind(prefix)
                .bind(limit + 1)
                .fetch_all(&self.pool)
                .await?
            }
            SortRange::Between(lo, hi) => {
                sqlx::query(
                    r#"
                    SELECT partition_key, sort_key, payload, updated_at
                    FROM records
                    WHERE partition_key = $1
                      AND sort_key > $2
                      AND sort_key >= $3
                      AND sort_key <= $4
                    ORDER BY sort_key ASC
                    LIMIT $5
                    "#,
                )
                .bind(partition_key)
                .bind(&token)
                .bind(lo)
                .bind(hi)
                .bind(limit + 1)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut items: Vec<Record> = rows.iter().map(Self::row_to_record).collect();
        let next_token = if items.len() as i64 > limit {
            items.truncate(limit as usize);
            items.last().map(|r| r.sort_key.clone())
        } else {
            None
        };

        Ok(QueryPage { items, next_token })
    }

    async fn delete(&self, partition_key: &str, sort_key: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM records
            WHERE partition_key = $1 AND sort_key = $2
            "#,
        )
        .bind(partition_key)
        .bind(sort_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
