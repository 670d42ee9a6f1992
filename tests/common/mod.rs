//! Common test utilities for integration tests
//!
//! Shared fixtures and helpers: temporary databases, food-table seeding,
//! and a scriptable in-memory embedding provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tempfile::TempDir;

use fooddb::adapters::sqlite::create_pool;
use fooddb::domain::errors::{DomainError, DomainResult};
use fooddb::domain::ports::EmbeddingProvider;

/// Open a pooled SQLite database in a fresh temporary directory.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub async fn setup_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("test.sqlite");
    let pool = create_pool(path.to_str().unwrap(), 5)
        .await
        .expect("failed to create test pool");
    (dir, pool)
}

/// Create the external `food` table the record source reads.
#[allow(dead_code)]
pub async fn create_food_table(pool: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS food (fdc_id INTEGER PRIMARY KEY, description TEXT NOT NULL)",
    )
    .execute(pool)
    .await
    .expect("failed to create food table");
}

#[allow(dead_code)]
pub async fn insert_food(pool: &SqlitePool, fdc_id: i64, description: &str) {
    sqlx::query("INSERT INTO food (fdc_id, description) VALUES (?, ?)")
        .bind(fdc_id)
        .bind(description)
        .execute(pool)
        .await
        .expect("failed to insert food row");
}

/// Seed `count` food rows with ids `1..=count`.
#[allow(dead_code)]
pub async fn seed_foods(pool: &SqlitePool, count: i64) {
    create_food_table(pool).await;
    for fdc_id in 1..=count {
        insert_food(pool, fdc_id, &format!("food item {fdc_id}")).await;
    }
}

/// Scriptable embedding provider for tests.
///
/// Produces a deterministic unit vector per text, so identical texts get
/// identical embeddings across calls. A failure marker makes any batch
/// containing it fail permanently, mimicking a sub-batch whose retries
/// were exhausted.
pub struct MockEmbeddingProvider {
    dimension: usize,
    max_batch: usize,
    model: String,
    configured: bool,
    fail_marker: Option<String>,
    fixed_vector: Option<Vec<f32>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_batch: 100,
            model: "mock-embedding-model".to_string(),
            configured: true,
            fail_marker: None,
            fixed_vector: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Any batch containing a text with this marker fails permanently.
    pub fn with_fail_marker(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// Return this vector for every text instead of the derived one.
    pub fn with_fixed_vector(mut self, vector: Vec<f32>) -> Self {
        self.fixed_vector = Some(vector);
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Number of `embed_batch`/`embed` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Deterministic pseudo-random unit vector derived from the text.
    pub fn vector_for(text: &str, dimension: usize) -> Vec<f32> {
        let mut state: u32 = text
            .bytes()
            .fold(2_166_136_261_u32, |h, b| (h ^ u32::from(b)).wrapping_mul(16_777_619));

        let mut vector: Vec<f32> = (0..dimension)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((state >> 8) as f32 / (1 << 24) as f32) - 0.5
            })
            .collect();

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        _deadline: Option<Instant>,
    ) -> DomainResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(marker) = &self.fail_marker {
            if texts.iter().any(|t| t.contains(marker)) {
                return Err(DomainError::EmbeddingFailed(
                    "mock permanent failure".to_string(),
                ));
            }
        }

        Ok(texts
            .iter()
            .map(|text| {
                self.fixed_vector
                    .clone()
                    .unwrap_or_else(|| Self::vector_for(text, self.dimension))
            })
            .collect())
    }

    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()], None).await?;
        Ok(vectors.remove(0))
    }
}
