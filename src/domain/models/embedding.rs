//! Embedding domain models.
//!
//! A record owns at most one embedding per model generation; re-embedding
//! replaces the stored row wholesale.

use serde::{Deserialize, Serialize};

/// An embedding ready to be persisted: the record it belongs to, its
/// vector, and the model that produced it. `created_at` is stamped by
/// the store at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEmbedding {
    pub fdc_id: i64,
    pub vector: Vec<f32>,
    pub model: String,
}

impl RecordEmbedding {
    pub fn new(fdc_id: i64, vector: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            fdc_id,
            vector,
            model: model.into(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// A single similarity search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Food record id.
    pub fdc_id: i64,
    /// Food description, hydrated from the relational store.
    pub description: String,
    /// Cosine distance to the query vector (lower is closer).
    pub distance: f32,
    /// Normalized similarity in `[0, 1]`, 1.0 = exact match.
    pub similarity: f32,
}

impl SearchHit {
    /// Build a hit from a KNN result, converting cosine distance to a
    /// similarity score.
    ///
    /// Cosine distance ranges over `[0, 2]` (0 = identical, 2 = opposite),
    /// so `1 - d/2` maps it onto `[1, 0]`. The clamp only absorbs float
    /// noise at the boundaries.
    pub fn new(fdc_id: i64, description: String, distance: f32) -> Self {
        let similarity = (1.0 - distance / 2.0).clamp(0.0, 1.0);
        Self {
            fdc_id,
            description,
            distance,
            similarity,
        }
    }

    /// Similarity rounded for display. Full precision is retained in
    /// `self.similarity`.
    pub fn similarity_pct(&self) -> String {
        format!("{:.1}%", self.similarity * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_from_distance() {
        let exact = SearchHit::new(42, "butter".to_string(), 0.0);
        assert!((exact.similarity - 1.0).abs() < f32::EPSILON);

        let orthogonal = SearchHit::new(7, "gravel".to_string(), 1.0);
        assert!((orthogonal.similarity - 0.5).abs() < f32::EPSILON);

        let opposite = SearchHit::new(9, "antibutter".to_string(), 2.0);
        assert!(opposite.similarity.abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_clamped() {
        // Float noise can push cosine distance slightly outside [0, 2].
        let hit = SearchHit::new(1, "x".to_string(), 2.000001);
        assert!(hit.similarity >= 0.0);

        let hit = SearchHit::new(1, "x".to_string(), -0.000001);
        assert!(hit.similarity <= 1.0);
    }

    #[test]
    fn test_similarity_monotonic_in_distance() {
        let close = SearchHit::new(42, "a".to_string(), 0.1);
        let far = SearchHit::new(7, "b".to_string(), 0.3);
        assert!(close.similarity > far.similarity);
    }

    #[test]
    fn test_similarity_pct_rounding() {
        let hit = SearchHit::new(1, "x".to_string(), 0.5);
        assert_eq!(hit.similarity_pct(), "75.0%");
    }

    #[test]
    fn test_record_embedding_dimension() {
        let row = RecordEmbedding::new(1, vec![0.1, 0.2, 0.3], "text-embedding-3-small");
        assert_eq!(row.dimension(), 3);
    }
}
