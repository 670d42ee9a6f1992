//! Vector store implementation over SQLite.
//!
//! Embeddings live in a `vec0` virtual table (sqlite-vec) when the
//! extension is available, with the record's `fdc_id` as rowid. When it
//! is not, a plain BLOB table plus a pure-Rust cosine scan provides the
//! same contract. Row metadata (model, dimension, timestamp) is kept in
//! a companion table written in the same transaction; the candidate
//! existence predicate targets that table.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::extensions::is_vec0_available;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::RecordEmbedding;
use crate::domain::ports::VectorIndex;

/// Vector backend in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorBackend {
    /// Native sqlite-vec `vec0` virtual table with SIMD-accelerated KNN
    NativeVec0,
    /// Plain BLOB table with a pure-Rust cosine distance scan
    PureRust,
}

/// Durable embedding storage with KNN lookup.
pub struct SqliteVectorStore {
    pool: SqlitePool,
    backend: VectorBackend,
}

impl SqliteVectorStore {
    /// Create a store, probing for the `vec0` extension.
    ///
    /// Falls back to the pure-Rust scan when the extension is missing;
    /// the contract is identical, only KNN latency differs.
    pub async fn new(pool: SqlitePool) -> Self {
        let backend = if is_vec0_available(&pool).await {
            tracing::debug!("vec0 extension active, using native KNN");
            VectorBackend::NativeVec0
        } else {
            tracing::warn!("vec0 extension unavailable, using pure-Rust KNN scan");
            VectorBackend::PureRust
        };

        Self { pool, backend }
    }

    pub fn backend(&self) -> VectorBackend {
        self.backend
    }

    /// Dimension the index was created with, if initialized.
    pub async fn configured_dimension(&self) -> DomainResult<Option<usize>> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='vector_config'",
        )
        .fetch_one(&self.pool)
        .await?;
        if exists == 0 {
            return Ok(None);
        }

        let row: Option<String> =
            sqlx::query_scalar("SELECT value FROM vector_config WHERE key = 'dimension'")
                .fetch_optional(&self.pool)
                .await?;

        row.map(|v| {
            v.parse::<usize>()
                .map_err(|_| DomainError::DatabaseError(format!("corrupt dimension value: {v}")))
        })
        .transpose()
    }

    /// Serialize an embedding to little-endian `f32` bytes, the layout
    /// both `vec0` and the fallback table store.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize little-endian `f32` bytes back into an embedding.
    fn bytes_to_embedding(bytes: &[u8]) -> DomainResult<Vec<f32>> {
        if bytes.len() % 4 != 0 {
            return Err(DomainError::SerializationError(
                "embedding blob length not a multiple of 4".to_string(),
            ));
        }

        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    /// Cosine distance between two vectors: `1 - cos(a, b)`, in `[0, 2]`.
    pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return f32::MAX;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if mag_a == 0.0 || mag_b == 0.0 {
            return f32::MAX;
        }

        1.0 - (dot / (mag_a * mag_b))
    }

    async fn expected_dimension(&self) -> DomainResult<usize> {
        self.configured_dimension().await?.ok_or_else(|| {
            DomainError::DatabaseError(
                "embedding index not initialized; run ensure_schema first".to_string(),
            )
        })
    }

    async fn knn_native(&self, query: &[f32], k: usize) -> DomainResult<Vec<(i64, f32)>> {
        let query_bytes = Self::embedding_to_bytes(query);

        let rows = sqlx::query(
            r#"
            SELECT rowid, distance
            FROM food_embeddings
            WHERE embedding MATCH ?
            ORDER BY distance
            LIMIT ?
            "#,
        )
        .bind(&query_bytes)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut results: Vec<(i64, f32)> = rows
            .into_iter()
            .map(|row| {
                let id: i64 = row.get("rowid");
                let distance: f64 = row.get("distance");
                (id, distance as f32)
            })
            .collect();

        // vec0 orders by distance only; make ties deterministic.
        sort_by_distance_then_id(&mut results);
        Ok(results)
    }

    async fn knn_scan(&self, query: &[f32], k: usize) -> DomainResult<Vec<(i64, f32)>> {
        let rows = sqlx::query("SELECT fdc_id, embedding FROM food_embeddings")
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("fdc_id");
            let bytes: Vec<u8> = row.get("embedding");
            let embedding = Self::bytes_to_embedding(&bytes)?;
            results.push((id, Self::cosine_distance(query, &embedding)));
        }

        sort_by_distance_then_id(&mut results);
        results.truncate(k);
        Ok(results)
    }
}

fn sort_by_distance_then_id(results: &mut [(i64, f32)]) {
    results.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
}

#[async_trait]
impl VectorIndex for SqliteVectorStore {
    async fn ensure_schema(&self, dimension: usize) -> DomainResult<()> {
        if dimension == 0 {
            return Err(DomainError::ValidationFailed(
                "embedding dimension must be positive".to_string(),
            ));
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vector_config (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        )
        .execute(&self.pool)
        .await?;

        if let Some(found) = self.configured_dimension().await? {
            if found != dimension {
                return Err(DomainError::SchemaMismatch {
                    expected: dimension,
                    found,
                });
            }
            // Already initialized with this dimension; tables exist.
            return Ok(());
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS embedding_metadata (
                fdc_id INTEGER PRIMARY KEY,
                model TEXT NOT NULL,
                dimension INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        match self.backend {
            VectorBackend::NativeVec0 => {
                let ddl = format!(
                    "CREATE VIRTUAL TABLE IF NOT EXISTS food_embeddings \
                     USING vec0(embedding float[{dimension}] distance_metric=cosine)"
                );
                sqlx::query(&ddl).execute(&self.pool).await?;
            }
            VectorBackend::PureRust => {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS food_embeddings (
                        fdc_id INTEGER PRIMARY KEY,
                        embedding BLOB NOT NULL
                    )
                    "#,
                )
                .execute(&self.pool)
                .await?;
            }
        }

        sqlx::query("INSERT INTO vector_config (key, value) VALUES ('dimension', ?)")
            .bind(dimension.to_string())
            .execute(&self.pool)
            .await?;

        tracing::info!(dimension, backend = ?self.backend, "embedding schema ready");
        Ok(())
    }

    async fn bulk_insert(&self, rows: &[RecordEmbedding]) -> DomainResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let expected = self.expected_dimension().await?;
        for row in rows {
            if row.vector.len() != expected {
                return Err(DomainError::DimensionMismatch {
                    expected,
                    actual: row.vector.len(),
                });
            }
        }

        let created_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for row in rows {
            let bytes = Self::embedding_to_bytes(&row.vector);

            match self.backend {
                VectorBackend::NativeVec0 => {
                    // Virtual tables do not honor OR REPLACE; delete the
                    // record's slot first so re-embedding replaces it.
                    sqlx::query("DELETE FROM food_embeddings WHERE rowid = ?")
                        .bind(row.fdc_id)
                        .execute(&mut *tx)
                        .await?;
                    sqlx::query(
                        "INSERT INTO food_embeddings (rowid, embedding) VALUES (?, ?)",
                    )
                    .bind(row.fdc_id)
                    .bind(&bytes)
                    .execute(&mut *tx)
                    .await?;
                }
                VectorBackend::PureRust => {
                    sqlx::query(
                        "INSERT OR REPLACE INTO food_embeddings (fdc_id, embedding) VALUES (?, ?)",
                    )
                    .bind(row.fdc_id)
                    .bind(&bytes)
                    .execute(&mut *tx)
                    .await?;
                }
            }

            sqlx::query(
                r#"
                INSERT OR REPLACE INTO embedding_metadata (fdc_id, model, dimension, created_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(row.fdc_id)
            .bind(&row.model)
            .bind(expected as i64)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn knn_search(&self, query: &[f32], k: usize) -> DomainResult<Vec<(i64, f32)>> {
        let expected = self.expected_dimension().await?;
        if query.len() != expected {
            return Err(DomainError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        match self.backend {
            VectorBackend::NativeVec0 => self.knn_native(query, k).await,
            VectorBackend::PureRust => self.knn_scan(query, k).await,
        }
    }

    async fn count(&self) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM embedding_metadata")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn normalized_embedding_strategy(dim: usize) -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(-1.0f32..1.0f32, dim..=dim).prop_map(|mut vec| {
            let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
            if magnitude > 0.0 {
                for val in &mut vec {
                    *val /= magnitude;
                }
            }
            vec
        })
    }

    proptest! {
        /// Cosine distance of valid non-zero vectors stays in [0, 2].
        #[test]
        fn proptest_cosine_distance_bounds(
            emb1 in normalized_embedding_strategy(32),
            emb2 in normalized_embedding_strategy(32)
        ) {
            let distance = SqliteVectorStore::cosine_distance(&emb1, &emb2);
            prop_assume!(distance != f32::MAX);
            prop_assert!(
                (-1e-5..=2.0 + 1e-5).contains(&distance),
                "cosine distance out of range: {}",
                distance
            );
        }

        /// distance(a, b) == distance(b, a).
        #[test]
        fn proptest_cosine_distance_symmetry(
            emb1 in normalized_embedding_strategy(32),
            emb2 in normalized_embedding_strategy(32)
        ) {
            let d_ab = SqliteVectorStore::cosine_distance(&emb1, &emb2);
            let d_ba = SqliteVectorStore::cosine_distance(&emb2, &emb1);
            prop_assert!((d_ab - d_ba).abs() < 1e-6);
        }

        /// Serialization roundtrip preserves every component.
        #[test]
        fn proptest_serialization_roundtrip(
            embedding in prop::collection::vec(-10.0f32..10.0f32, 1..128)
        ) {
            let bytes = SqliteVectorStore::embedding_to_bytes(&embedding);
            prop_assert_eq!(bytes.len(), embedding.len() * 4);

            let restored = SqliteVectorStore::bytes_to_embedding(&bytes).unwrap();
            prop_assert_eq!(embedding, restored);
        }
    }
}
