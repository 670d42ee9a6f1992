//! Embedding service adapters.

pub mod error;
pub mod openai;
pub mod retry;

pub use error::EmbeddingApiError;
pub use openai::OpenAiEmbeddingClient;
pub use retry::RetryPolicy;
