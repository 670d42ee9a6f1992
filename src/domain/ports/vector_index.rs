//! Vector index port.
//!
//! Durable embedding storage with bulk write and nearest-neighbor read.
//! The index dimension is fixed at creation; every write and query is
//! validated against it.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::RecordEmbedding;

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Idempotently create the embedding storage sized for `dimension`.
    ///
    /// Fails with `SchemaMismatch` when an existing index was created
    /// with a different dimension.
    async fn ensure_schema(&self, dimension: usize) -> DomainResult<()>;

    /// Write many embedding rows in one transaction, all-or-nothing.
    ///
    /// Rows are keyed by `fdc_id`; re-inserting replaces the record's
    /// single embedding slot. Any row whose vector length differs from
    /// the index dimension fails the whole call with `DimensionMismatch`
    /// and leaves the store unmodified.
    async fn bulk_insert(&self, rows: &[RecordEmbedding]) -> DomainResult<()>;

    /// The `k` stored vectors closest to `query` by cosine distance,
    /// ascending, ties broken by ascending `fdc_id`.
    async fn knn_search(&self, query: &[f32], k: usize) -> DomainResult<Vec<(i64, f32)>>;

    /// Number of stored embeddings.
    async fn count(&self) -> DomainResult<u64>;
}
