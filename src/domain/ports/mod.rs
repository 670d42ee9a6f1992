//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - `EmbeddingProvider`: text → vector via the external embedding service
//! - `RecordSource`: read-only access to the relational food table
//! - `VectorIndex`: durable embedding storage with KNN lookup

pub mod embedding;
pub mod record_source;
pub mod vector_index;

pub use embedding::EmbeddingProvider;
pub use record_source::RecordSource;
pub use vector_index::VectorIndex;
