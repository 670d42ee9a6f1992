//! OpenAI embedding provider adapter.
//!
//! Talks to the OpenAI `/v1/embeddings` endpoint (or any compatible
//! server). Transient failures are retried with deadline-aware
//! exponential backoff; the response is re-sorted by `index` so the
//! output order always matches the input order.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::EmbeddingApiError;
use super::retry::RetryPolicy;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EmbeddingConfig, RetryConfig};
use crate::domain::ports::EmbeddingProvider;

/// OpenAI embedding client.
pub struct OpenAiEmbeddingClient {
    config: EmbeddingConfig,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl OpenAiEmbeddingClient {
    pub fn new(config: EmbeddingConfig, retry: &RetryConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ServiceUnavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            retry: RetryPolicy::from(retry),
        })
    }

    fn resolve_api_key(&self) -> Result<String, EmbeddingApiError> {
        self.config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or(EmbeddingApiError::MissingApiKey)
    }

    async fn call_embeddings_api(
        &self,
        api_key: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingApiError> {
        let url = format!("{}/embeddings", self.config.base_url);

        let request_body = EmbeddingsRequest {
            model: self.config.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(EmbeddingApiError::from_status(status, body));
        }

        let result: EmbeddingsResponse = response.json().await?;

        if result.data.len() != texts.len() {
            return Err(EmbeddingApiError::MalformedResponse(format!(
                "requested {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        // The API may return items out of order; re-sort by index so the
        // caller can zip vectors back onto record ids positionally.
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn max_batch_size(&self) -> usize {
        self.config.max_batch_size
    }

    fn is_configured(&self) -> bool {
        self.resolve_api_key().is_ok()
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        deadline: Option<Instant>,
    ) -> DomainResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > self.config.max_batch_size {
            return Err(DomainError::ValidationFailed(format!(
                "batch of {} texts exceeds the API maximum of {}",
                texts.len(),
                self.config.max_batch_size
            )));
        }

        let api_key = self.resolve_api_key().map_err(DomainError::from)?;

        let vectors = self
            .retry
            .execute(deadline, || self.call_embeddings_api(&api_key, texts))
            .await?;

        Ok(vectors)
    }

    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()], None).await?;
        vectors
            .pop()
            .ok_or_else(|| DomainError::EmbeddingFailed("empty embedding response".to_string()))
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: String) -> OpenAiEmbeddingClient {
        let config = EmbeddingConfig {
            api_key: Some("test-key".to_string()),
            base_url,
            dimension: 3,
            max_batch_size: 4,
            ..EmbeddingConfig::default()
        };
        let retry = RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 10,
            max_backoff_ms: 50,
        };
        OpenAiEmbeddingClient::new(config, &retry).unwrap()
    }

    #[test]
    fn test_api_key_from_config() {
        let client = test_client("http://localhost".to_string());
        assert_eq!(client.resolve_api_key().unwrap(), "test-key");
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_input_order() {
        let mut server = mockito::Server::new_async().await;
        // Items deliberately returned out of order.
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[
                    {"index":1,"embedding":[0.0,1.0,0.0]},
                    {"index":0,"embedding":[1.0,0.0,0.0]}
                ]}"#,
            )
            .create_async()
            .await;

        let client = test_client(server.url());
        let texts = vec!["butter".to_string(), "bread".to_string()];
        let vectors = client.embed_batch(&texts, None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_transient_error_is_retried_until_exhausted() {
        let mut server = mockito::Server::new_async().await;
        // max_retries = 2, so the client should hit the endpoint 3 times.
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(500)
            .with_body("internal error")
            .expect(3)
            .create_async()
            .await;

        let client = test_client(server.url());
        let result = client.embed("butter").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(DomainError::EmbeddingFailed(_))));
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(401)
            .with_body("invalid key")
            .expect(1)
            .create_async()
            .await;

        let client = test_client(server.url());
        let result = client.embed("butter").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(DomainError::EmbeddingFailed(_))));
    }

    #[tokio::test]
    async fn test_batch_over_api_maximum_rejected() {
        let client = test_client("http://localhost".to_string());
        let texts: Vec<String> = (0..5).map(|i| format!("text {}", i)).collect();

        let result = client.embed_batch(&texts, None).await;
        assert!(matches!(result, Err(DomainError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_count_mismatch_is_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"index":0,"embedding":[1.0,0.0,0.0]}]}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        let texts = vec!["a".to_string(), "b".to_string()];
        let result = client.embed_batch(&texts, None).await;

        assert!(matches!(result, Err(DomainError::EmbeddingFailed(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_call() {
        let client = test_client("http://localhost:1".to_string());
        let vectors = client.embed_batch(&[], None).await.unwrap();
        assert!(vectors.is_empty());
    }
}
