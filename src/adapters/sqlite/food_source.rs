//! SQLite implementation of the `RecordSource` port.
//!
//! Read-only queries over the external `food` table. Candidate selection
//! uses an existence predicate against `embedding_metadata` instead of a
//! join: the missing set shrinks toward zero over a long import, and
//! `NOT EXISTS` stays fast as it does.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::domain::errors::DomainResult;
use crate::domain::models::FoodRecord;
use crate::domain::ports::RecordSource;

#[derive(Clone)]
pub struct SqliteFoodSource {
    pool: SqlitePool,
}

impl SqliteFoodSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordSource for SqliteFoodSource {
    async fn count_total(&self) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM food")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_missing(&self) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM food f
            WHERE NOT EXISTS (
                SELECT 1 FROM embedding_metadata em
                WHERE em.fdc_id = f.fdc_id
            )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn candidates_missing_embedding(&self, limit: u32) -> DomainResult<Vec<FoodRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT f.fdc_id, f.description
            FROM food f
            WHERE NOT EXISTS (
                SELECT 1 FROM embedding_metadata em
                WHERE em.fdc_id = f.fdc_id
            )
            ORDER BY f.fdc_id
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FoodRecord {
                fdc_id: row.get("fdc_id"),
                description: row.get("description"),
            })
            .collect())
    }

    async fn descriptions(&self, ids: &[i64]) -> DomainResult<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT fdc_id, description FROM food WHERE fdc_id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("fdc_id"), row.get("description")))
            .collect())
    }
}
