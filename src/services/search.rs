//! Similarity search service.
//!
//! Natural-language query to ranked food records: embed the query,
//! run KNN over the vector index, convert distances to similarity
//! scores, and hydrate descriptions from the relational store.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::SearchHit;
use crate::domain::ports::{EmbeddingProvider, RecordSource, VectorIndex};

pub struct SearchService {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    records: Arc<dyn RecordSource>,
}

impl SearchService {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        records: Arc<dyn RecordSource>,
    ) -> Self {
        Self {
            provider,
            index,
            records,
        }
    }

    /// Top-`k` records most similar to `query`, best match first.
    ///
    /// Results carry a similarity in `[0, 1]` (1.0 = exact match),
    /// monotonically decreasing in cosine distance; the ordering mirrors
    /// the index's ascending-distance order.
    pub async fn search(&self, query: &str, k: usize) -> DomainResult<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(DomainError::InvalidQuery);
        }
        // Fail fast instead of making a doomed round trip.
        if !self.provider.is_configured() {
            return Err(DomainError::ServiceUnavailable(
                "no embedding API credential configured".to_string(),
            ));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        debug!(query, k, "embedding search query");
        let query_vector = self.provider.embed(query).await?;

        let neighbors = self.index.knn_search(&query_vector, k).await?;
        if neighbors.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = neighbors.iter().map(|(id, _)| *id).collect();
        let descriptions = self.records.descriptions(&ids).await?;

        let mut hits = Vec::with_capacity(neighbors.len());
        for (fdc_id, distance) in neighbors {
            match descriptions.get(&fdc_id) {
                Some(description) => {
                    hits.push(SearchHit::new(fdc_id, description.clone(), distance));
                }
                None => {
                    // The food row vanished under its embedding; skip it
                    // rather than return an unnamed hit.
                    warn!(fdc_id, "embedding has no backing food record");
                }
            }
        }

        debug!(results = hits.len(), "search complete");
        Ok(hits)
    }
}
