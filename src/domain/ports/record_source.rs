//! Record source port.
//!
//! Read interface over the external relational food table. This
//! subsystem consumes it, never writes it.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::FoodRecord;

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Total number of food records.
    async fn count_total(&self) -> DomainResult<u64>;

    /// Number of records with no embedding row.
    async fn count_missing(&self) -> DomainResult<u64>;

    /// Up to `limit` records lacking an embedding, ordered by ascending
    /// `fdc_id` so repeated pulls within one run make monotonic progress.
    async fn candidates_missing_embedding(&self, limit: u32) -> DomainResult<Vec<FoodRecord>>;

    /// Resolve ids to descriptions for search-result hydration.
    async fn descriptions(&self, ids: &[i64]) -> DomainResult<HashMap<i64, String>>;
}
