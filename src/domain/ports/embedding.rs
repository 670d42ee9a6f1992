//! Embedding provider port.
//!
//! Converts text into dense vectors through an external service. The
//! provider owns its retry policy; callers pass a deadline so a backoff
//! sleep can never outlive the pipeline's global budget.

use std::time::Instant;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g. "openai", "mock").
    fn name(&self) -> &'static str;

    /// Model identifier recorded alongside each stored vector.
    fn model(&self) -> &str;

    /// Vector dimension this provider/model produces.
    fn dimension(&self) -> usize;

    /// Maximum number of texts per single API call.
    fn max_batch_size(&self) -> usize;

    /// Whether a credential is available. Checked before any round trip
    /// so a misconfigured service fails fast instead of slow.
    fn is_configured(&self) -> bool;

    /// Generate embeddings for a batch of texts in a single API call.
    ///
    /// The returned vector at position `i` corresponds to `texts[i]`;
    /// callers zip results back onto record ids positionally. Transient
    /// failures are retried internally; if a retry backoff would cross
    /// `deadline`, the call fails fast with `DeadlineExceeded`.
    async fn embed_batch(
        &self,
        texts: &[String],
        deadline: Option<Instant>,
    ) -> DomainResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>>;
}
